use super::*;

mod sensor_tests {
    use super::*;

    #[test]
    fn kind_tags() {
        assert_eq!(SensorKind::from_tag('T').unwrap(), SensorKind::Temperature);
        assert_eq!(SensorKind::from_tag('P').unwrap(), SensorKind::Pressure);
        for tag in ['X', 't', 'p', ' '] {
            assert_eq!(
                SensorKind::from_tag(tag),
                Err(RegistryError::UnknownKind(tag.to_string()))
            );
        }
    }

    #[test]
    fn ingest_parses_by_kind() {
        let mut t = Sensor::temperature("T-001");
        let mut p = Sensor::pressure("P-001");

        assert_eq!(t.ingest_text("25.6"), Value::Temperature(25.6));
        assert_eq!(p.ingest_text("1013"), Value::Pressure(1013));
        assert_eq!(t.reading_count(), 1);
        assert_eq!(p.reading_count(), 1);
    }

    #[test]
    fn malformed_text_is_recorded_as_zero() {
        let mut t = Sensor::temperature("T-001");
        let mut p = Sensor::pressure("P-001");

        assert_eq!(t.ingest_text("abc"), Value::Temperature(0.0));
        assert_eq!(p.ingest_text("12.5"), Value::Pressure(0));
        assert_eq!(p.ingest_text(""), Value::Pressure(0));
        assert_eq!(p.reading_count(), 2);
    }

    #[test]
    fn temperature_drops_lowest_before_mean() {
        let mut t = Sensor::temperature("T-001");
        for raw in ["30.0", "10.0", "20.0"] {
            t.ingest_text(raw);
        }

        let a = t.process();
        assert_eq!(a.kind, SensorKind::Temperature);
        assert_eq!(
            a.outcome,
            Outcome::Mean {
                value: Value::Temperature(25.0),
                samples: 2,
            }
        );
        assert_eq!(t.reading_count(), 2);
    }

    #[test]
    fn temperature_process_consumes_a_reading_each_pass() {
        let mut t = Sensor::temperature("T-001");
        for raw in ["30.0", "10.0", "20.0"] {
            t.ingest_text(raw);
        }

        t.process();
        let second = t.process();
        assert_eq!(second.mean(), Some(Value::Temperature(30.0)));
        assert_eq!(
            second.outcome,
            Outcome::Mean {
                value: Value::Temperature(30.0),
                samples: 1,
            }
        );
    }

    #[test]
    fn pressure_process_is_idempotent() {
        let mut p = Sensor::pressure("P-001");
        p.ingest_text("100");
        p.ingest_text("200");

        let first = p.process();
        let second = p.process();
        assert_eq!(first.mean(), Some(Value::Pressure(150)));
        assert_eq!(first, second);
        assert_eq!(p.reading_count(), 2);
    }

    #[test]
    fn single_malformed_temperature_means_zero() {
        let mut t = Sensor::temperature("T-001");
        t.ingest_text("abc");

        let a = t.process();
        assert_eq!(a.mean(), Some(Value::Temperature(0.0)));
        assert_eq!(t.reading_count(), 1);
    }

    #[test]
    fn empty_sensor_reports_no_readings() {
        let mut t = Sensor::temperature("T-001");
        let a = t.process();

        assert_eq!(a.outcome, Outcome::NoReadings);
        assert_eq!(a.mean(), None);
        assert!(a.to_string().ends_with("No readings."));
    }

    #[test]
    fn summary_text() {
        let mut p = Sensor::pressure("P-001");
        p.ingest_text("100");

        assert_eq!(
            p.process().to_string(),
            "-> Processing sensor P-001 (pressure)\n   Mean of readings: 100 (1 readings)"
        );
    }

    #[test]
    fn describe_is_kind_tagged() {
        let mut t = Sensor::temperature("T-001");
        assert_eq!(t.describe(), "[TemperatureSensor] ID=T-001 readings=0");
        assert_eq!(
            Sensor::pressure("P-001").describe(),
            "[PressureSensor] ID=P-001 readings=0"
        );

        t.ingest_text("21.0");
        let line = t.describe();
        assert!(line.starts_with("[TemperatureSensor] ID=T-001 readings=1 last="));
    }
}

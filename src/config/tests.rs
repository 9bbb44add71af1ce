use super::*;

mod config_tests {
    use super::*;

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn port_is_first_arg() {
        // the 'first' arg is index 1 -- AFTER the command name
        let result = parse_config(&args(&["exec-name", "/dev/ttyACM0"])).unwrap();

        assert_eq!(result.port, PathBuf::from("/dev/ttyACM0"));
        assert_eq!(result.baud, DEFAULT_BAUD);
    }

    #[test]
    fn baud_is_second_arg() {
        let argv = args(&["exec-name", "/dev/ttyS0", "9600", "extra-arg"]);
        let result = parse_config(&argv).unwrap();

        assert_eq!(result.port, PathBuf::from("/dev/ttyS0"));
        assert_eq!(result.baud, 9600);
    }

    #[test]
    fn defaults_with_no_args() {
        let result = parse_config(&args(&["exec-name"])).unwrap();
        assert_eq!(result, Config::default());
        assert_eq!(result.port, PathBuf::from(DEFAULT_PORT));
        assert_eq!(result.process_every, 5);
    }

    #[test]
    fn rejects_bad_baud() {
        for bad in ["fast", "0", "-9600"] {
            assert_eq!(
                parse_config(&args(&["exec-name", "/dev/ttyS0", bad])),
                Err(ConfigError::BadBaud(bad.into()))
            );
        }
    }
}

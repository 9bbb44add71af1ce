use super::*;

mod serial_tests {
    use super::*;
    use hex_literal::hex;

    // "T;T-001;25.6\r\n" followed by the start of the next frame
    const TWO_PARTIAL_FRAMES: [u8; 18] = hex!("543b 542d 3030 313b 3235 2e36 0d0a 503b 502d");

    #[test]
    fn splits_on_crlf_and_keeps_partial_tail() {
        let mut lb = LineBuffer::new();
        lb.push(&TWO_PARTIAL_FRAMES);

        assert_eq!(lb.next_line().as_deref(), Some("T;T-001;25.6"));
        assert_eq!(lb.next_line(), None);

        lb.push(b"001;990\n");
        assert_eq!(lb.next_line().as_deref(), Some("P;P-001;990"));
        assert_eq!(lb.next_line(), None);
    }

    #[test]
    fn skips_blank_lines() {
        let mut lb = LineBuffer::new();
        lb.push(b"\r\n\n\rP;P-1;5\r\r\n");

        assert_eq!(lb.next_line().as_deref(), Some("P;P-1;5"));
        assert_eq!(lb.next_line(), None);
    }

    #[test]
    fn bare_cr_terminates_a_line() {
        let mut lb = LineBuffer::new();
        lb.push(b"T;A;1\rT;B;2\r");

        assert_eq!(lb.next_line().as_deref(), Some("T;A;1"));
        assert_eq!(lb.next_line().as_deref(), Some("T;B;2"));
    }

    #[test]
    fn overlong_line_is_flushed() {
        let mut lb = LineBuffer::new();
        lb.push(&[b'x'; MAX_LINE_BYTES + 10]);

        assert_eq!(lb.next_line().map(|l| l.len()), Some(MAX_LINE_BYTES));
        assert_eq!(lb.next_line(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut lb = LineBuffer::new();
        lb.push(&hex!("543b ff3b 310a"));

        assert_eq!(lb.next_line().as_deref(), Some("T;\u{fffd};1"));
    }

    #[test]
    fn mock_source_yields_scripted_lines() {
        let mut seq = mockall::Sequence::new();
        let mut src = MockFrameSource::new();
        src.expect_read_line()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(Some("T;T-001;1".into())));
        src.expect_read_line()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(SerialError::Disconnected));

        assert_eq!(src.read_line().unwrap().as_deref(), Some("T;T-001;1"));
        assert!(matches!(src.read_line(), Err(SerialError::Disconnected)));
    }

    #[test]
    fn reads_time_out_without_waiting_for_a_first_byte() {
        assert_eq!(READ_MIN_BYTES, 0);
    }

    #[test]
    fn io_hangups_are_disconnects() {
        for errno in [EIO, ENXIO, ENODEV] {
            let err = rppal::uart::Error::Io(io::Error::from_raw_os_error(errno));
            let got = classify_read_error(err);
            assert!(matches!(got, SerialError::Disconnected));
        }

        let err = rppal::uart::Error::Io(io::Error::from(io::ErrorKind::BrokenPipe));
        let got = classify_read_error(err);
        assert!(matches!(got, SerialError::Disconnected));
    }

    #[test]
    fn other_read_errors_keep_the_port() {
        let err = rppal::uart::Error::Io(io::Error::from(io::ErrorKind::TimedOut));
        assert!(matches!(classify_read_error(err), SerialError::Read(_)));
    }

    #[test]
    fn vanished_device_node_is_a_disconnect() {
        assert!(ensure_present(&std::env::temp_dir()).is_ok());
        assert!(matches!(
            ensure_present(Path::new("/dev/sensorhub-no-such-tty")),
            Err(SerialError::Disconnected)
        ));
    }
}

//! # Integration Tests
//!
//! End-to-end tests over loopback TCP.
//!
//! Covers:
//! - configuration file -> player construction
//! - trace file -> player -> publisher -> subscriber
//! - trace file -> player -> publisher -> bridge -> subscriber
//! - synthetic generator -> publisher -> subscriber

#[cfg(test)]
mod contract_tests {
    use std::io::Write;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::StreamKind;
    use playback::StreamPlayer;

    /// A loaded stream section is enough to open the player it describes
    #[test]
    fn test_stream_blueprint_opens_player() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,bitrate\n0.0,4000\n0.033,4100\n0.066,3900").unwrap();

        let config = format!(
            "[stream]\nkind = \"video\"\nrate_hz = 30.0\npath = {:?}\n",
            file.path().display().to_string()
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let stream = blueprint.stream.unwrap();
        assert_eq!(stream.kind, StreamKind::Video);
        assert_eq!(stream.bind_addr().to_string(), "0.0.0.0:5566");

        let player = StreamPlayer::open(
            stream.trace_path().unwrap(),
            stream.kind,
            stream.rate().unwrap(),
        )
        .unwrap();
        assert_eq!(player.trace().len_hint(), 3);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, EndpointAddr, Sample, StreamKind, TransportConfig};
    use playback::{PlaybackLimit, StreamPlayer, SyntheticGenerator};
    use relay::{Bridge, build_filter};
    use tempfile::NamedTempFile;
    use transport::{Publisher, SampleSource, Subscriber, TransportContext};

    const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    fn ctx() -> TransportContext {
        TransportContext::new(TransportConfig {
            settle_ms: 0,
            queue_capacity: 1024,
        })
    }

    fn trace_file(rows: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,x,y,z").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    fn loopback(publisher: &Publisher) -> EndpointAddr {
        EndpointAddr::new("127.0.0.1", publisher.local_addr().port())
    }

    async fn collect(subscriber: &mut Subscriber, count: usize) -> Vec<String> {
        let mut received = Vec::with_capacity(count);
        for _ in 0..count {
            received.push(subscriber.recv().await.unwrap().encode());
        }
        received
    }

    /// Trace file -> StreamPlayer -> Publisher -> Subscriber
    #[tokio::test]
    async fn test_e2e_trace_playback() {
        let file = trace_file(&["0.0,0.1,0.2,0.3", "0.01,0.4,0.5,0.6"]);
        let ctx = ctx();

        let mut publisher = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();
        let mut subscriber = ctx
            .subscriber(&loopback(&publisher), StreamKind::Haptic)
            .await
            .unwrap();
        assert!(publisher.wait_for_subscribers(1, CONNECT_TIMEOUT).await);

        let rate = contracts::RateSpec::from_hz(100.0).unwrap();
        let mut player = StreamPlayer::open(file.path(), StreamKind::Haptic, rate).unwrap();

        let (report, received) = tokio::join!(
            player.play(&mut publisher, PlaybackLimit::Cycles(3)),
            collect(&mut subscriber, 6)
        );
        let report = report.unwrap();

        assert_eq!(report.samples, 6);
        assert_eq!(report.cycles, 3);
        assert_eq!(
            received,
            vec![
                "0.0,0.1,0.2,0.3",
                "0.01,0.4,0.5,0.6",
                "0.0,0.1,0.2,0.3",
                "0.01,0.4,0.5,0.6",
                "0.0,0.1,0.2,0.3",
                "0.01,0.4,0.5,0.6",
            ]
        );
    }

    /// Trace file -> StreamPlayer -> Publisher -> Bridge(dead-band) -> Subscriber
    #[tokio::test]
    async fn test_e2e_relay_chain_with_dead_band() {
        let file = trace_file(&["0.0,0.1,0.2,0.3", "0.01,0.15,0.2,0.3", "0.02,0.6,0.6,0.6"]);
        let ctx = ctx();

        let mut upstream = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();

        let config = format!(
            r#"
            [relay]
            kind = "haptic"
            in_host = "127.0.0.1"
            in_port = {}
            out_port = 1

            [relay.filter]
            kind = "dead_band"
            threshold = 0.25
            "#,
            upstream.local_addr().port()
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let mut relay_config = blueprint.relay.unwrap();
        // Ephemeral republish port for the test
        relay_config.out_port = 0;

        let filter = build_filter(&relay_config.filter).unwrap();
        let mut bridge = Bridge::open(&ctx, &relay_config, filter).await.unwrap();
        assert!(upstream.wait_for_subscribers(1, CONNECT_TIMEOUT).await);

        let mut downstream = ctx
            .subscriber(&loopback(bridge.sink()), StreamKind::Haptic)
            .await
            .unwrap();
        assert!(bridge.sink().wait_for_subscribers(1, CONNECT_TIMEOUT).await);

        let rate = contracts::RateSpec::from_hz(100.0).unwrap();
        let mut player = StreamPlayer::open(file.path(), StreamKind::Haptic, rate).unwrap();

        let (played, bridged, received) = tokio::join!(
            player.play(&mut upstream, PlaybackLimit::Cycles(2)),
            bridge.run_for(6),
            collect(&mut downstream, 4)
        );
        played.unwrap();
        let stats = bridged.unwrap();

        assert_eq!(stats.received, 6);
        assert_eq!(stats.forwarded, 4);
        assert_eq!(stats.dropped, 2);
        assert_eq!(
            received,
            vec![
                "0.0,0.1,0.2,0.3",
                "0.02,0.6,0.6,0.6",
                "0.0,0.1,0.2,0.3",
                "0.02,0.6,0.6,0.6",
            ]
        );
    }

    /// Identity relay keeps content and order
    #[tokio::test]
    async fn test_e2e_identity_relay_preserves_order() {
        let ctx = ctx();
        let upstream = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();

        let relay_config = contracts::RelayConfig {
            kind: StreamKind::Video,
            in_host: "127.0.0.1".to_string(),
            in_port: upstream.local_addr().port(),
            out_port: 0,
            filter: contracts::FilterConfig::Identity,
        };
        let filter = build_filter(&relay_config.filter).unwrap();
        let mut bridge = Bridge::open(&ctx, &relay_config, filter).await.unwrap();
        assert!(upstream.wait_for_subscribers(1, CONNECT_TIMEOUT).await);

        let mut downstream = ctx
            .subscriber(&loopback(bridge.sink()), StreamKind::Video)
            .await
            .unwrap();
        assert!(bridge.sink().wait_for_subscribers(1, CONNECT_TIMEOUT).await);

        let sent: Vec<String> = (0..50)
            .map(|i| format!("{:.5},{}", f64::from(i) / 30.0, 2000 + i * 100))
            .collect();
        for line in &sent {
            upstream.publish_line(line).unwrap();
        }

        let (bridged, received) = tokio::join!(bridge.run_for(50), collect(&mut downstream, 50));
        assert_eq!(bridged.unwrap().forwarded, 50);
        assert_eq!(received, sent);
    }

    /// A missing trace fails before anything is published
    #[tokio::test]
    async fn test_e2e_missing_trace_emits_nothing() {
        let ctx = ctx();
        let publisher = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();

        let rate = contracts::RateSpec::from_hz(100.0).unwrap();
        let result = StreamPlayer::open("/nonexistent/run01/tactile.csv", StreamKind::Haptic, rate);

        assert!(matches!(result, Err(ContractError::NotFound { .. })));
        assert_eq!(publisher.metrics().published(), 0);
    }

    /// Synthetic generator -> Publisher -> Subscriber
    #[tokio::test]
    async fn test_e2e_generator() {
        let ctx = ctx();
        let mut publisher = ctx
            .publisher(&EndpointAddr::new("127.0.0.1", 0))
            .await
            .unwrap();
        let mut subscriber = ctx
            .subscriber(&loopback(&publisher), StreamKind::Video)
            .await
            .unwrap();
        assert!(publisher.wait_for_subscribers(1, CONNECT_TIMEOUT).await);

        let rate = contracts::RateSpec::from_hz(200.0).unwrap();
        let mut generator = SyntheticGenerator::new(StreamKind::Video, rate);

        let (emitted, received) = tokio::join!(
            generator.play(&mut publisher, Some(5)),
            async {
                let mut samples: Vec<Sample> = Vec::new();
                for _ in 0..5 {
                    samples.push(subscriber.recv().await.unwrap());
                }
                samples
            }
        );
        assert_eq!(emitted.unwrap(), 5);

        let mut last = -1.0;
        for sample in &received {
            let ts = sample.timestamp().unwrap();
            assert!(ts >= last);
            last = ts;

            let kbps: u32 = sample.field(1).unwrap().as_str().parse().unwrap();
            assert!((2000..=8000).contains(&kbps));
        }
    }
}

mod common;

mod tests {
    use embassy_time::Duration;
    use netpins_core::animation::{
        TailAnimation, TailAnimationDevice, TailConfig, TailDirection,
    };
    use netpins_core::device::{ChannelDevice, PixelSlice, SliceLayout};
    use netpins_core::{Rgb, Rgbw};

    use super::common::MockBus;

    const RED: Rgbw = Rgbw::new(255, 0, 0, 0);
    const BLUE: Rgbw = Rgbw::new(0, 0, 255, 0);

    fn tail(direction: TailDirection, tail_length: u16, duration_ms: u64) -> TailAnimation {
        let line = PixelSlice::new(0, 0, 9, SliceLayout::Rgb);
        let mut tail = TailAnimation::new(line, direction, 50);
        tail.set_color1(Rgb::new(255, 0, 0));
        tail.set_color2(Rgb::new(0, 0, 255));
        tail.set_tail_length(tail_length);
        tail.set_duration(Duration::from_millis(duration_ms));
        tail.restart();
        tail
    }

    #[test]
    fn test_right_tail_fills_skipped_pixels() {
        let mut bus = MockBus::with_strips(&[10]);
        // Three frames: head at 0, 5 and 10
        let mut tail = tail(TailDirection::Right, 0, 60);

        let events = tail.frame(&mut bus);
        assert!(events.started);
        assert!(bus.strips[0].writes.is_empty());

        tail.frame(&mut bus);
        let pixels = bus.pixels(0);
        assert_eq!(pixels[5], RED);
        assert_eq!(&pixels[1..5], &[BLUE; 4]);
        assert_eq!(pixels[0], Rgbw::BLACK);
        assert_eq!(pixels[6], Rgbw::BLACK);

        let events = tail.frame(&mut bus);
        assert!(events.head_reached_end);
        assert!(events.ended);
        assert_eq!(&bus.pixels(0)[6..10], &[BLUE; 4]);
    }

    #[test]
    fn test_left_tail_runs_backwards() {
        let mut bus = MockBus::with_strips(&[10]);
        let mut tail = tail(TailDirection::Left, 0, 60);

        tail.frame(&mut bus);
        assert!(bus.strips[0].writes.is_empty());

        let events = tail.frame(&mut bus);
        assert!(!events.head_reached_end);
        let pixels = bus.pixels(0);
        assert_eq!(pixels[5], RED);
        assert_eq!(&pixels[6..10], &[BLUE; 4]);
        assert_eq!(pixels[4], Rgbw::BLACK);

        let events = tail.frame(&mut bus);
        assert!(events.head_reached_end);
        assert_eq!(bus.pixels(0)[0], RED);
        assert_eq!(&bus.pixels(0)[1..5], &[BLUE; 4]);
    }

    #[test]
    fn test_tail_blends_from_head() {
        let mut bus = MockBus::with_strips(&[10]);
        // 13 frames over a span of 13 pixels
        let mut tail = tail(TailDirection::Right, 3, 260);

        tail.frame(&mut bus);
        assert_eq!(bus.pixels(0)[0], RED);

        tail.frame(&mut bus);
        let pixels = bus.pixels(0);
        assert_eq!(pixels[1], RED);
        assert!(pixels[0].r > 0 && pixels[0].r < 255);
        assert!(pixels[0].b > 0 && pixels[0].b < 255);
    }

    #[test]
    fn test_head_reached_end_once_per_pass() {
        let mut bus = MockBus::with_strips(&[10]);
        let mut tail = tail(TailDirection::Right, 3, 260);
        tail.set_repeat(true);

        let mut reached = 0;
        let mut ended = 0;
        for _ in 0..26 {
            let events = tail.frame(&mut bus);
            reached += usize::from(events.head_reached_end);
            ended += usize::from(events.ended);
        }
        assert_eq!(ended, 2);
        assert_eq!(reached, 2);
    }

    #[test]
    fn test_device_channels() {
        let mut bus = MockBus::with_strips(&[10]);
        let line = PixelSlice::new(0, 0, 9, SliceLayout::Rgb);
        let mut device = ChannelDevice::from(TailAnimationDevice::new(line, &TailConfig::default()));
        assert_eq!(device.channel_count(), 8);

        device.apply(&[255, 0, 0, 0, 0, 255, 255, 2], &mut bus);
        let ChannelDevice::Tail(tail) = &device else {
            unreachable!()
        };
        let animation = tail.animation().animation();
        assert!(animation.is_running());
        assert!(animation.is_repeating());
        assert_eq!(animation.total_frames(), 1500);

        assert!(device.animate(&mut bus).started);
        assert_eq!(bus.pixels(0)[0], RED);

        device.apply(&[255, 0, 0, 0, 0, 255, 0, 2], &mut bus);
        let ChannelDevice::Tail(tail) = &device else {
            unreachable!()
        };
        assert!(!tail.animation().animation().is_repeating());
        assert!(tail.animation().animation().is_running());
    }

    #[test]
    fn test_tail_stays_inside_offset_line() {
        for direction in [TailDirection::Right, TailDirection::Left] {
            let mut bus = MockBus::with_strips(&[20]);
            let line = PixelSlice::new(0, 5, 9, SliceLayout::Rgb);
            let mut tail = TailAnimation::new(line, direction, 50);
            tail.set_color1(Rgb::new(255, 0, 0));
            tail.set_color2(Rgb::new(0, 0, 255));
            tail.set_tail_length(6);
            // Three frames over a span of 11 pixels
            tail.set_duration(Duration::from_millis(60));
            tail.restart();

            while tail.animation().is_running() {
                tail.frame(&mut bus);
            }
            let writes = &bus.strips[0].writes;
            assert!(!writes.is_empty());
            assert!(writes.iter().all(|index| (5..=9).contains(index)), "{writes:?}");
            assert_eq!(&bus.pixels(0)[..5], &[Rgbw::BLACK; 5]);
            assert_eq!(&bus.pixels(0)[10..], &[Rgbw::BLACK; 10]);
        }
    }

    fn tail_device(device: &ChannelDevice) -> &TailAnimationDevice {
        let ChannelDevice::Tail(tail) = device else {
            unreachable!()
        };
        tail
    }

    #[test]
    fn test_duration_change_rebases_running_pass() {
        let mut bus = MockBus::with_strips(&[10]);
        let line = PixelSlice::new(0, 0, 9, SliceLayout::Rgb);
        let mut device = ChannelDevice::from(TailAnimationDevice::new(line, &TailConfig::default()));

        device.apply(&[255, 0, 0, 0, 0, 255, 255, 2], &mut bus);
        for _ in 0..100 {
            device.animate(&mut bus);
        }
        let animation = tail_device(&device).animation().animation();
        assert_eq!(animation.total_frames(), 1500);
        let progress = animation.progress();

        device.apply(&[255, 0, 0, 0, 0, 255, 10, 2], &mut bus);
        let animation = tail_device(&device).animation().animation();
        // 10 / 255 of 30 s at 50 Hz
        assert_eq!(animation.total_frames(), 58);
        assert_eq!(animation.remaining_frames(), 54);
        assert!((animation.progress() - progress).abs() < 0.05);
        assert!(animation.is_repeating());

        assert!(!device.animate(&mut bus).started);
    }

    #[test]
    fn test_repeat_waits_for_duration() {
        let mut bus = MockBus::with_strips(&[10]);
        let line = PixelSlice::new(0, 0, 9, SliceLayout::Rgb);
        let config = TailConfig {
            repeat: true,
            ..TailConfig::default()
        };
        let mut device = ChannelDevice::from(TailAnimationDevice::new(line, &config));

        for _ in 0..5 {
            assert!(device.animate(&mut bus).is_empty());
        }
        assert!(bus.strips[0].writes.is_empty());

        device.apply(&[255, 0, 0, 0, 0, 255, 255, 2], &mut bus);
        assert!(tail_device(&device).animation().animation().is_running());
        assert!(device.animate(&mut bus).started);
    }
}

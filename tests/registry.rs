mod common;

mod tests {
    use netpins_core::Rgbw;
    use netpins_core::device::{Dimmer, PixelSlice, Servo, ServoConfig, SliceLayout};
    use netpins_core::gamma::{dimmer_gamma, pixel_gamma};
    use netpins_core::registry::DeviceRegistry;

    use super::common::MockBus;

    #[test]
    fn test_devices_take_consecutive_channels() {
        let mut bus = MockBus::with_strips(&[2]);
        let mut registry = DeviceRegistry::<8>::new(3);
        registry.add(Dimmer::new(0)).unwrap();
        registry
            .add(PixelSlice::new(0, 0, 1, SliceLayout::Rgb))
            .unwrap();
        registry.add(Dimmer::new(1)).unwrap();
        assert_eq!(registry.channel_count(), 5);

        let mut frame = [0u8; 512];
        frame[2..7].copy_from_slice(&[10, 255, 0, 0, 20]);
        let report = registry.apply(&frame, &mut bus);

        assert_eq!(report.applied, 3);
        assert_eq!(report.channels, 5);
        assert!(!report.truncated);
        assert_eq!(bus.duties, [(0, dimmer_gamma(10)), (1, dimmer_gamma(20))]);
        assert_eq!(bus.pixels(0)[1], Rgbw::new(255, 0, 0, 0));
    }

    #[test]
    fn test_slice_and_servo_from_first_channel() {
        let mut bus = MockBus::with_strips(&[3]);
        let mut registry = DeviceRegistry::<4>::new(1);
        registry
            .add(PixelSlice::new(0, 0, 2, SliceLayout::Rgb))
            .unwrap();
        registry.add(Servo::new(ServoConfig::new(5))).unwrap();

        let report = registry.apply(&[10, 20, 30, 128], &mut bus);
        assert_eq!(report.applied, 2);
        assert_eq!(report.channels, 4);

        let expected = Rgbw::new(pixel_gamma(10), pixel_gamma(20), pixel_gamma(30), 0);
        assert_ne!(expected, Rgbw::new(10, 20, 30, 0));
        assert_eq!(bus.pixels(0), &[expected; 3]);
        assert_eq!(bus.angles, [(5, 90)]);
    }

    #[test]
    fn test_short_frame_stops_at_first_unserved_device() {
        let mut bus = MockBus::default();
        let mut registry = DeviceRegistry::<4>::new(1);
        registry.add(Dimmer::new(0)).unwrap();
        registry.add(Dimmer::new(1)).unwrap();
        registry.add(Dimmer::new(2)).unwrap();

        let report = registry.apply(&[50, 60], &mut bus);
        assert_eq!(report.applied, 2);
        assert!(report.truncated);
        assert_eq!(bus.duties.len(), 2);
        assert_eq!(bus.last_duty(2), None);
    }

    #[test]
    fn test_remove_shifts_following_devices() {
        let mut bus = MockBus::default();
        let mut registry = DeviceRegistry::<4>::new(1);
        let first = registry.add(Dimmer::new(0)).unwrap();
        registry.add_named("servo", Servo::new(ServoConfig::new(7))).unwrap();
        assert_eq!(registry.channel_offset_of("servo"), Some(1));

        assert!(registry.remove(first).is_some());
        assert!(registry.remove(first).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.channel_offset_of("servo"), Some(0));

        registry.apply(&[255], &mut bus);
        assert_eq!(bus.angles, [(7, 180)]);
    }

    #[test]
    fn test_full_registry_returns_device() {
        let mut registry = DeviceRegistry::<1>::new(1);
        registry.add(Dimmer::new(0)).unwrap();
        let rejected = registry.add(Dimmer::new(1)).unwrap_err();
        assert_eq!(rejected.channel_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut registry = DeviceRegistry::<4>::new(1);
        registry
            .add_named("strip", PixelSlice::new(0, 0, 9, SliceLayout::Rgbw))
            .unwrap();
        let id = registry.add_named("fan", Dimmer::new(2)).unwrap();

        assert_eq!(registry.channel_offset_of("fan"), Some(4));
        assert_eq!(registry.channel_offset_of("missing"), None);
        assert!(registry.get(id).is_some());
        let (offset, device) = registry.find("strip").unwrap();
        assert_eq!((offset, device.channel_count()), (0, 4));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let mut registry = DeviceRegistry::<2>::new(1);
        let long = "a-very-long-device-name-that-does-not-fit";
        registry.add_named(long, Dimmer::new(0)).unwrap();
        assert_eq!(registry.channel_offset_of(long), None);
        assert_eq!(registry.channel_offset_of(&long[..24]), Some(0));
    }

    #[test]
    fn test_switch_all() {
        let mut bus = MockBus::with_strips(&[2]);
        let mut registry = DeviceRegistry::<4>::new(1);
        registry.add(Dimmer::new(0)).unwrap();
        registry
            .add(PixelSlice::new(0, 0, 1, SliceLayout::Rgbw))
            .unwrap();

        registry.switch_all(true, &mut bus);
        assert_eq!(bus.pixels(0)[0], Rgbw::WHITE);
        registry.switch_all(false, &mut bus);
        assert_eq!(bus.pixels(0)[0], Rgbw::BLACK);
        assert_eq!(bus.last_duty(0), Some(0));
    }
}

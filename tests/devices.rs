mod common;

mod tests {
    use heapless::Vec;
    use netpins_core::Rgbw;
    use netpins_core::device::{
        ChannelDevice, DeviceGroup, Dimmer, DimmerMode, PixelSlice, Servo, ServoConfig,
        SliceLayout, StripConfig,
    };
    use netpins_core::gamma::{DIMMER_MAX_DUTY, dimmer_gamma};

    use super::common::MockBus;

    const RED: Rgbw = Rgbw::new(255, 0, 0, 0);

    #[test]
    fn test_dimmer_writes_gamma_duty_on_change() {
        let mut bus = MockBus::default();
        let mut device = ChannelDevice::from(Dimmer::new(3));
        assert_eq!(device.channel_count(), 1);

        device.apply(&[0], &mut bus);
        assert!(bus.duties.is_empty());

        device.apply(&[200], &mut bus);
        device.apply(&[200], &mut bus);
        assert_eq!(bus.duties, [(3, dimmer_gamma(200))]);

        device.switch(true, &mut bus);
        assert_eq!(bus.last_duty(3), Some(DIMMER_MAX_DUTY));
    }

    #[test]
    fn test_slice_fills_range_once() {
        let mut bus = MockBus::with_strips(&[8]);
        let mut device = ChannelDevice::from(PixelSlice::new(0, 2, 4, SliceLayout::Rgb));
        assert_eq!(device.channel_count(), 3);

        device.apply(&[255, 0, 0], &mut bus);
        assert_eq!(bus.strips[0].writes, [2, 3, 4]);
        assert_eq!(bus.pixels(0)[1], Rgbw::BLACK);
        assert_eq!(bus.pixels(0)[3], RED);
        assert_eq!(bus.pixels(0)[5], Rgbw::BLACK);

        bus.clear_log();
        device.apply(&[255, 0, 0], &mut bus);
        assert!(bus.strips[0].writes.is_empty());
    }

    #[test]
    fn test_dimmable_rgbw_slice() {
        let mut bus = MockBus::with_strips(&[4]);
        let mut device =
            ChannelDevice::from(PixelSlice::new(0, 0, 3, SliceLayout::Rgbw).with_dimmer());
        assert_eq!(device.channel_count(), 5);

        device.apply(&[255, 0, 0, 255, 128], &mut bus);
        assert_eq!(bus.pixels(0)[0], Rgbw::new(128, 0, 0, 128));

        device.apply(&[255, 0, 0, 255, 0], &mut bus);
        assert_eq!(bus.pixels(0)[0], Rgbw::BLACK);
    }

    #[test]
    fn test_slice_clips_to_strip() {
        let mut bus = MockBus::with_strips(&[3]);
        let mut device = ChannelDevice::from(PixelSlice::new(0, 1, 9, SliceLayout::Rgb));
        device.apply(&[255, 0, 0], &mut bus);
        assert_eq!(bus.strips[0].writes, [1, 2]);
    }

    #[test]
    fn test_slice_on_missing_strip_is_ignored() {
        let mut bus = MockBus::default();
        let mut device = ChannelDevice::from(PixelSlice::new(4, 0, 1, SliceLayout::Rgb));
        device.apply(&[255, 255, 255], &mut bus);
        assert!(bus.strips.is_empty());
    }

    fn strip_config(dimmer: DimmerMode) -> StripConfig {
        StripConfig {
            strip: 0,
            pixel_count: 10,
            layout: SliceLayout::Rgb,
            dimmer,
            slices: Vec::from_slice(&[0, 4]).unwrap(),
        }
    }

    #[test]
    fn test_group_with_shared_dimmer() {
        let mut bus = MockBus::with_strips(&[10]);
        let group = DeviceGroup::from_strip(&strip_config(DimmerMode::Single));
        assert_eq!(group.slices().len(), 2);
        assert_eq!(group.slices()[0].last_pixel(), 3);
        assert_eq!(group.slices()[1].first_pixel(), 4);
        assert_eq!(group.slices()[1].last_pixel(), 9);

        let mut device = ChannelDevice::from(group);
        assert_eq!(device.channel_count(), 7);

        device.apply(&[255, 0, 0, 0, 0, 255, 128], &mut bus);
        assert_eq!(bus.pixels(0)[0], Rgbw::new(128, 0, 0, 0));
        assert_eq!(bus.pixels(0)[3], Rgbw::new(128, 0, 0, 0));
        assert_eq!(bus.pixels(0)[4], Rgbw::new(0, 0, 128, 0));
        assert_eq!(bus.pixels(0)[9], Rgbw::new(0, 0, 128, 0));
    }

    #[test]
    fn test_group_with_per_slice_dimmers() {
        let mut bus = MockBus::with_strips(&[10]);
        let mut device = ChannelDevice::from(DeviceGroup::from_strip(&strip_config(
            DimmerMode::PerSlice,
        )));
        assert_eq!(device.channel_count(), 8);

        device.apply(&[255, 0, 0, 0, 0, 0, 255, 255], &mut bus);
        assert_eq!(bus.pixels(0)[0], Rgbw::BLACK);
        assert_eq!(bus.pixels(0)[5], Rgbw::new(0, 0, 255, 0));
    }

    #[test]
    fn test_group_without_slices_covers_strip() {
        let config = StripConfig {
            slices: Vec::new(),
            ..strip_config(DimmerMode::None)
        };
        let group = DeviceGroup::from_strip(&config);
        assert_eq!(group.slices().len(), 1);
        assert_eq!(group.slices()[0].len(), 10);
        assert_eq!(group.channel_count(), 3);
    }

    #[test]
    fn test_group_skips_overlapping_starts() {
        let config = StripConfig {
            slices: Vec::from_slice(&[0, 6, 3, 6, 8, 12]).unwrap(),
            ..strip_config(DimmerMode::None)
        };
        let group = DeviceGroup::from_strip(&config);
        let ranges: std::vec::Vec<_> = group
            .slices()
            .iter()
            .map(|slice| (slice.first_pixel(), slice.last_pixel()))
            .collect();
        assert_eq!(ranges, [(0, 5), (6, 7), (8, 9)]);
    }

    #[test]
    fn test_servo_maps_to_angle() {
        let mut bus = MockBus::default();
        let mut device = ChannelDevice::from(Servo::new(ServoConfig::new(5)));

        device.apply(&[128], &mut bus);
        device.apply(&[128], &mut bus);
        device.apply(&[255], &mut bus);
        assert_eq!(bus.angles, [(5, 90), (5, 180)]);
        assert!(!device.switch(true, &mut bus));
    }

    #[test]
    fn test_dimmer_mode_names() {
        for mode in [DimmerMode::None, DimmerMode::Single, DimmerMode::PerSlice] {
            assert_eq!(DimmerMode::parse_from_str(mode.as_str()), mode);
        }
        assert_eq!(DimmerMode::parse_from_str("bogus"), DimmerMode::None);
    }
}

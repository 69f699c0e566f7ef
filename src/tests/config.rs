use crate::config::Configuration;
use crate::registers::Setting;

#[test]
fn test_defaults() {
    let config = Configuration::default();

    assert!(config.arbitrate);
    assert!(!config.user_crc);
    assert!(!config.full_duplex);
    assert_eq!(10, config.idle_wait_len);
    assert_eq!(20, config.tx_permit_len);
    assert_eq!(0, config.max_idle_len);
    assert_eq!(39, config.div_ls);
    assert_eq!(3, config.div_hs);
    assert_eq!(0xff, config.filter);
    assert_eq!([0xff; 2], config.multicast);
}

#[test]
fn test_setting_register() {
    let config = Configuration {
        tx_push_pull: true,
        user_crc: true,
        ..Default::default()
    };

    assert_eq!(0b0001_0101, u8::from(config.setting_register()));
}

#[test]
fn test_apply_setting_register() {
    let mut config = Configuration::default();
    config.apply_setting_register(Setting::from(0b0010_1010));

    assert!(config.break_sync);
    assert!(config.no_drop);
    assert!(config.tx_invert);
    assert!(!config.arbitrate);
    assert!(!config.tx_push_pull);
}

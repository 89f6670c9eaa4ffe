//! Initialization when the base directory does not exist

mod common;

use common::FakeHook;
use unrealsdk::{config, logging, sdk, Hook};

#[test]
fn test_init_survives_unwritable_log_dir() {
    let root = tempfile::tempdir().unwrap();
    let home = root.path().join("not").join("there");
    std::env::set_var(config::HOME_ENV, &home);

    let factory = || Box::new(FakeHook::new()) as Box<dyn Hook>;
    assert!(sdk::init(&factory).unwrap());
    assert!(sdk::is_initialized());

    // Console-only logging is still our subscriber
    assert!(logging::is_initialized());
    assert!(!config::get().log_path(&home).exists());
    assert_eq!(config::get().unrealsdk, config::SdkConfig::default());
}

use fangen_quest::{SettingKey, UserId, UserSettings};

use crate::config::FangenConfig;

pub fn show(config: &FangenConfig, user: UserId) -> Result<(), String> {
    let store = super::open_store(config)?;
    let settings = UserSettings::load(store.as_ref(), user).map_err(|e| e.to_string())?;
    print(&settings);
    Ok(())
}

pub fn toggle(config: &FangenConfig, user: UserId, key: &str) -> Result<(), String> {
    let key = parse_key(key)?;
    if key != SettingKey::Notifications {
        return Err(format!("{key:?} is not an on/off setting; use `settings cycle`"));
    }
    change(config, user, key)
}

pub fn cycle(config: &FangenConfig, user: UserId, key: &str) -> Result<(), String> {
    let key = parse_key(key)?;
    if key == SettingKey::Notifications {
        return Err("notifications is an on/off setting; use `settings toggle`".into());
    }
    change(config, user, key)
}

fn change(config: &FangenConfig, user: UserId, key: SettingKey) -> Result<(), String> {
    let engine = super::progress_engine(config)?;
    let settings = engine
        .update_setting(user, key)
        .map_err(|e| e.to_string())?;
    print(&settings);
    Ok(())
}

fn parse_key(key: &str) -> Result<SettingKey, String> {
    SettingKey::parse(key).ok_or_else(|| format!("unknown setting: \"{key}\""))
}

fn print(settings: &UserSettings) {
    for line in settings.to_string().lines() {
        println!("  {line}");
    }
}

use anyhow::Result;
use mme_soleil::config::env_file::load_env_file;
use mme_soleil::Settings;
use std::io::Write;

#[test]
fn test_env_file_overrides_existing_values() -> Result<()> {
    std::env::set_var("MME_SOLEIL_TEST_OVERRIDE", "from-process");

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "# site secrets")?;
    writeln!(file, "MME_SOLEIL_TEST_OVERRIDE=from-file")?;
    writeln!(file, "MME_SOLEIL_TEST_QUOTED=\"with spaces\"")?;
    file.flush()?;

    let count = load_env_file(file.path())?;
    assert_eq!(count, 2);
    assert_eq!(std::env::var("MME_SOLEIL_TEST_OVERRIDE")?, "from-file");
    assert_eq!(std::env::var("MME_SOLEIL_TEST_QUOTED")?, "with spaces");
    Ok(())
}

#[test]
fn test_settings_read_from_loaded_env_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    for line in [
        "API_ADMIN_PASS=zonnig",
        "LOCATION_LAT=50.85",
        "LOCATION_LON=4.35",
        "LOCATION_ALTITUDE=60",
        "LOCATION_TIMEZONE=Europe/Brussels",
        "SOLAR_ARRAY1_TILT=35",
        "SOLAR_ARRAY1_AZIMUTH=180",
        "SOLAR_ARRAY1_HEIGHT=6",
        "SOLAR_ARRAY1_MODULECOUNT=6",
        "SOLAR_ARRAY2_TILT=35",
        "SOLAR_ARRAY2_AZIMUTH=270",
        "SOLAR_ARRAY2_HEIGHT=6",
        "SOLAR_ARRAY2_MODULECOUNT=5",
    ] {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;

    load_env_file(file.path())?;
    let settings = Settings::from_env()?;

    assert_eq!(settings.api_admin_pass, "zonnig");
    assert_eq!(settings.location.timezone, chrono_tz::Europe::Brussels);
    assert_eq!(settings.arrays.len(), 2);
    assert_eq!(settings.total_modules(), 11);
    assert_eq!(settings.arrays[1].azimuth, 270.0);
    Ok(())
}

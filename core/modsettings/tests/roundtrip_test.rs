use modsettings::process::{Format, dat_to_json, json_to_dat, read_document, write_document};
use modsettings::{Document, ModSettings, ModSettingsError, PropertyValue, VarString, Version};
use std::fs;
use std::str::FromStr;

// Writes a VLString the way the game does.
fn push_string(buf: &mut Vec<u8>, s: Option<&str>) {
    match s {
        None => buf.push(1),
        Some(s) => {
            buf.push(0);
            if s.len() >= 0xFF {
                buf.push(0xFF);
                buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
            } else {
                buf.push(s.len() as u8);
            }
            buf.extend_from_slice(s.as_bytes());
        }
    }
}

fn push_dict_header(buf: &mut Vec<u8>, count: u32) {
    buf.extend_from_slice(&[5, 0]);
    buf.extend_from_slice(&count.to_le_bytes());
}

// A mod-settings.dat with the three usual setting scopes.
fn sample_dat() -> Vec<u8> {
    let mut buf = Vec::new();
    for part in [2u16, 0, 28, 0] {
        buf.extend_from_slice(&part.to_le_bytes());
    }
    buf.push(1);

    push_dict_header(&mut buf, 3);

    push_string(&mut buf, Some("startup"));
    push_dict_header(&mut buf, 2);
    push_string(&mut buf, Some("my-mod-enable-thing"));
    push_dict_header(&mut buf, 1);
    push_string(&mut buf, Some("value"));
    buf.extend_from_slice(&[1, 0, 1]);
    push_string(&mut buf, Some("my-mod-long-text"));
    push_dict_header(&mut buf, 1);
    push_string(&mut buf, Some("value"));
    buf.extend_from_slice(&[3, 0]);
    push_string(&mut buf, Some(&"x".repeat(300)));

    push_string(&mut buf, Some("runtime-global"));
    push_dict_header(&mut buf, 1);
    push_string(&mut buf, Some("my-mod-rate"));
    push_dict_header(&mut buf, 1);
    push_string(&mut buf, Some("value"));
    buf.extend_from_slice(&[2, 0]);
    buf.extend_from_slice(&123456789.123456789f64.to_le_bytes());

    push_string(&mut buf, Some("runtime-per-user"));
    push_dict_header(&mut buf, 1);
    push_string(&mut buf, Some("my-mod-colors"));
    buf.extend_from_slice(&[4, 1]);
    buf.extend_from_slice(&2u32.to_le_bytes());
    push_string(&mut buf, Some(""));
    buf.extend_from_slice(&[2, 0]);
    buf.extend_from_slice(&1.0f64.to_le_bytes());
    push_string(&mut buf, Some(""));
    buf.extend_from_slice(&[0, 0]);

    buf
}

#[test]
fn test_binary_roundtrip_is_identity() {
    let bytes = sample_dat();
    let settings = ModSettings::from_bytes(&bytes).unwrap();

    assert_eq!(settings.version, Version::new(2, 0, 28, 0));
    assert!(settings.has_quality);
    let text = settings
        .data
        .get("startup")
        .and_then(|t| t.get("my-mod-long-text"))
        .and_then(|t| t.get("value"))
        .unwrap();
    assert_eq!(text.value, PropertyValue::String(VarString::from("x".repeat(300))));

    assert_eq!(settings.to_bytes().unwrap(), bytes);
}

#[test]
fn test_text_roundtrip_is_identity_apart_from_any_type() {
    let bytes = sample_dat();
    let settings = ModSettings::from_bytes(&bytes).unwrap();

    let text = Document::from(settings).to_string_pretty().unwrap();
    let Document::Settings(reread) = Document::from_str(&text).unwrap() else {
        panic!("expected an envelope");
    };

    // The list in runtime-per-user carries any_type=1, which the text form drops
    let mut out = Vec::new();
    reread.write(&mut out).unwrap();
    let mut expected = bytes.clone();
    let pos = expected
        .windows(2)
        .rposition(|w| w == [4, 1])
        .unwrap();
    expected[pos + 1] = 0;
    assert_eq!(out, expected);
}

#[test]
fn test_file_conversion() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    let dat_path = root.join("mod-settings.dat");
    fs::write(&dat_path, sample_dat())?;

    let json_path = dat_to_json(&dat_path, &None)?;
    assert_eq!(json_path, root.join("mod-settings.json"));
    let json = fs::read_to_string(&json_path)?;
    assert!(json.contains("\"!type\": \"ModSettings\""));
    assert!(json.contains("\"runtime-global\""));

    let back_path = root.join("back.dat");
    let written = json_to_dat(&json_path, &Some(back_path.clone()))?;
    assert_eq!(written, back_path);

    let original = ModSettings::from_bytes(&sample_dat())?;
    let reread = ModSettings::from_bytes(&fs::read(&back_path)?)?;
    assert_eq!(reread.version, original.version);
    assert_eq!(reread.data.get("startup"), original.data.get("startup"));
    Ok(())
}

#[test]
fn test_dat_to_dat_reencodes() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let input = temp_dir.path().join("in.dat");
    let output = temp_dir.path().join("out.dat");
    fs::write(&input, sample_dat())?;

    let document = read_document(&input, Format::Dat)?;
    write_document(&document, &output, Format::Dat)?;
    assert_eq!(fs::read(&output)?, sample_dat());
    Ok(())
}

#[test]
fn test_old_version_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let input = temp_dir.path().join("old.dat");
    let mut bytes = sample_dat();
    bytes[2..4].copy_from_slice(&17u16.to_le_bytes());
    bytes[0..2].copy_from_slice(&0u16.to_le_bytes());
    fs::write(&input, bytes)?;

    let err = dat_to_json(&input, &None).unwrap_err();
    assert!(matches!(err, ModSettingsError::UnsupportedVersion(_)));
    assert!(!temp_dir.path().join("old.json").exists());
    Ok(())
}

#[test]
fn test_truncated_file_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let input = temp_dir.path().join("short.dat");
    let bytes = sample_dat();
    fs::write(&input, &bytes[..bytes.len() - 3])?;

    let err = dat_to_json(&input, &None).unwrap_err();
    assert!(matches!(err, ModSettingsError::TruncatedInput));
    Ok(())
}

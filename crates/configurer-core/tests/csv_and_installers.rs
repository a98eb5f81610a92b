mod common;

use common::{unique_temp_dir, write_file, CleanupDir};
use configurer_core::data::{self, InstallerArgRule};
use configurer_core::installer::{self, InstallerKind};
use configurer_core::ConfigurerError;

#[test]
fn registry_values_csv_keeps_incomplete_rows_for_validation() {
    let dir = unique_temp_dir("configurer-csv");
    let _cleanup = CleanupDir(dir.clone());
    let file = dir.join(data::REGISTRY_VALUES_FILE);
    write_file(
        &file,
        "Path,Name,Type,Value\n\
         HKEY_LOCAL_MACHINE\\Software\\Acme\\App,Enabled,REG_DWORD,1\n\
         HKCU\\Control Panel\\Desktop,Wallpaper,REG_SZ,\"C:\\Images\\a, b.png\"\n\
         HKCU\\Software\\Acme,,REG_SZ,x\n",
    );

    let rows: Vec<_> = data::load_registry_values(&file)
        .unwrap()
        .expect("file exists")
        .into_iter()
        .map(|record| record.expect("utf-8 record"))
        .collect();
    assert_eq!(rows.len(), 3);

    let first = rows[0].validate().unwrap();
    assert_eq!(first.path, "HKEY_LOCAL_MACHINE\\Software\\Acme\\App");
    assert_eq!(first.name, "Enabled");
    assert_eq!(first.value_type, "REG_DWORD");
    assert_eq!(first.value, "1");

    assert_eq!(rows[1].validate().unwrap().value, "C:\\Images\\a, b.png");
    assert!(matches!(
        rows[2].validate(),
        Err(ConfigurerError::MissingField { field: "Name", .. })
    ));
}

#[test]
fn undecodable_record_does_not_hide_the_other_rows() {
    let dir = unique_temp_dir("configurer-csv-cp1252");
    let _cleanup = CleanupDir(dir.clone());
    let file = dir.join(data::REGISTRY_VALUES_FILE);
    let mut content = b"Path,Name,Type,Value\n\
HKLM\\Software\\Acme,Enabled,REG_DWORD,1\n\
HKCU\\Software\\Acme,Caf"
        .to_vec();
    // "é" as saved by a cp1252 spreadsheet
    content.push(0xE9);
    content.extend_from_slice(b",REG_SZ,x\nHKCU\\Software\\Acme,Mode,REG_SZ,y\n");
    std::fs::write(&file, content).expect("write csv");

    let records = data::load_registry_values(&file).unwrap().expect("file exists");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].as_ref().unwrap().validate().unwrap().name, "Enabled");
    assert!(matches!(records[1], Err(ConfigurerError::Csv { .. })));
    assert_eq!(records[2].as_ref().unwrap().validate().unwrap().name, "Mode");
}

#[test]
fn installer_args_skip_undecodable_rules() {
    let dir = unique_temp_dir("configurer-args-cp1252");
    let _cleanup = CleanupDir(dir.clone());
    let file = dir.join(data::INSTALLER_ARGS_FILE);
    let mut content = b"Fichier,Args\nCaf".to_vec();
    content.push(0xE9);
    content.extend_from_slice(b"*.exe,/S\nParatext*.exe,/quiet\n");
    std::fs::write(&file, content).expect("write csv");

    let rules = data::load_installer_args(&file).unwrap().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].pattern, "Paratext*.exe");
}

#[test]
fn missing_csv_is_not_an_error() {
    let dir = unique_temp_dir("configurer-csv-missing");
    let _cleanup = CleanupDir(dir.clone());
    assert!(data::load_installer_args(&dir.join(data::INSTALLER_ARGS_FILE))
        .unwrap()
        .is_none());
}

#[test]
fn installer_args_csv_preserves_file_order() {
    let dir = unique_temp_dir("configurer-args");
    let _cleanup = CleanupDir(dir.clone());
    let file = dir.join(data::INSTALLER_ARGS_FILE);
    write_file(&file, "Fichier,Args\nParatext*.exe,/quiet\n*.exe,/S /norestart\n");

    let rules = data::load_installer_args(&file).unwrap().unwrap();
    assert_eq!(
        rules,
        vec![
            InstallerArgRule {
                pattern: "Paratext*.exe".into(),
                args: "/quiet".into()
            },
            InstallerArgRule {
                pattern: "*.exe".into(),
                args: "/S /norestart".into()
            },
        ]
    );
    assert_eq!(installer::installer_args(&rules, "Paratext9.exe"), vec!["/quiet"]);
    assert_eq!(installer::installer_args(&rules, "Other.exe"), vec!["/S", "/norestart"]);
}

#[test]
fn unmatched_installer_gets_no_arguments() {
    let rules = vec![InstallerArgRule {
        pattern: "Paratext*.exe".into(),
        args: "/quiet".into(),
    }];
    assert_eq!(installer::installer_args(&rules, "Paratext9.exe"), vec!["/quiet"]);
    assert!(installer::installer_args(&rules, "Other.exe").is_empty());
}

#[test]
fn discovers_installers_and_adds_latest_patch() {
    let dir = unique_temp_dir("configurer-apps");
    let _cleanup = CleanupDir(dir.clone());
    for name in [
        "Paratext9.exe",
        "Fonts.zip",
        "Tool.MSI",
        "readme.txt",
        "Paratext_9.4.99.msp",
        "Paratext_9.4.101.msp",
    ] {
        write_file(&dir.join(name), "");
    }
    std::fs::create_dir_all(dir.join("nested.exe")).unwrap();

    let suffixes: Vec<String> = [".exe", ".msi", ".zip"].iter().map(|s| s.to_string()).collect();
    let found = installer::find_installers(&dir, &suffixes).unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Fonts.zip", "Paratext9.exe", "Tool.MSI"]);

    let rules = vec![InstallerArgRule {
        pattern: "Paratext*.exe".into(),
        args: "/quiet".into(),
    }];
    let plan = installer::plan_install(&dir.join("Paratext9.exe"), &rules, "Paratext")
        .unwrap()
        .unwrap();
    assert_eq!(plan.kind, InstallerKind::Exe);
    assert_eq!(
        plan.args,
        vec![
            "/quiet".to_string(),
            format!("PATCH={}", dir.join("Paratext_9.4.101.msp").display()),
        ]
    );

    let msi = installer::plan_install(&dir.join("Tool.MSI"), &rules, "Paratext")
        .unwrap()
        .unwrap();
    assert_eq!(msi.kind, InstallerKind::Msi);
    assert!(msi.args.is_empty());

    let zip = installer::plan_install(&dir.join("Fonts.zip"), &rules, "Paratext")
        .unwrap()
        .unwrap();
    assert!(zip.command().is_none());

    assert!(installer::plan_install(&dir.join("readme.txt"), &rules, "Paratext")
        .unwrap()
        .is_none());
}

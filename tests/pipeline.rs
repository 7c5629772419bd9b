use std::fs;
use std::path::Path;

use octa_relabel::pipeline::angiovue::{self, AngiovueOptions};
use octa_relabel::pipeline::{revo, spectralis};
use octa_relabel::raw::{OutputFormat, RawGeometry};
use octa_relabel::registry::{ImageId, NameRow, RegistryRow};

fn row(
    pid: &str,
    instrument: &str,
    layer: &str,
    mm: &str,
    scans: Option<&str>,
    id: i64,
) -> RegistryRow {
    RegistryRow {
        participant_id: Some(pid.to_string()),
        instrument: Some(instrument.to_string()),
        layer: Some(layer.to_string()),
        size_mm: Some(mm.to_string()),
        size_scans: scans.map(str::to_string),
        image_id: Some(ImageId::Numeric(id)),
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn write_raw(path: &Path, geometry: RawGeometry) {
    let bytes: Vec<u8> = (0..geometry.pixel_count())
        .flat_map(|i| (i as f32 * 0.5).to_le_bytes())
        .collect();
    fs::write(path, bytes).unwrap();
}

#[test]
fn revo_tree_is_renamed_in_two_passes() {
    let root = tempfile::tempdir().unwrap();
    let leaf = root.path().join("OCTA001").join("3_400");
    fs::create_dir_all(&leaf).unwrap();
    fs::write(leaf.join("John Smith_Superficial.img"), b"superficial").unwrap();
    fs::write(leaf.join("John Smith_Deep.img"), b"deep").unwrap();
    fs::write(leaf.join("John Smith_Choroid.img"), b"unknown layer").unwrap();
    fs::write(leaf.join(".DS_Store"), b"").unwrap();

    let rows = vec![row("OCTA-001", "Revo", "Superficial", "3x3", Some("400x400"), 42)];

    let report = revo::run(root.path(), &rows).unwrap();
    let normalize = report.stage("normalize").unwrap();
    assert_eq!(normalize.renamed, 2);
    assert_eq!(normalize.skipped, 1);
    let rename = report.stage("rename").unwrap();
    assert_eq!(rename.renamed, 1);
    assert_eq!(rename.unmatched, 1);

    assert_eq!(
        file_names(&leaf),
        vec![".DS_Store", "0042.img", "John Smith_Choroid.img", "OCTA-001_RD3H.img"]
    );
    assert_eq!(fs::read(leaf.join("0042.img")).unwrap(), b"superficial");

    // A second run must not rename anything again
    let again = revo::run(root.path(), &rows).unwrap();
    assert_eq!(again.stage("rename").unwrap().renamed, 0);
    assert_eq!(
        file_names(&leaf),
        vec![".DS_Store", "0042.img", "John Smith_Choroid.img", "OCTA-001_RD3H.img"]
    );
}

#[test]
fn revo_leaf_without_layer_tag_is_left_alone() {
    let root = tempfile::tempdir().unwrap();
    let leaf = root.path().join("OCTA001").join("3_400");
    fs::create_dir_all(&leaf).unwrap();
    fs::write(leaf.join("Deepa Kumar.img"), b"no layer").unwrap();
    fs::write(leaf.join("OCTA-001_RQ3H.img"), b"unknown code").unwrap();

    let rows = vec![row("OCTA-001", "Revo", "Deep", "3x3", Some("400x400"), 42)];
    let report = revo::run(root.path(), &rows).unwrap();

    assert_eq!(report.stage("normalize").unwrap().skipped, 1);
    let rename = report.stage("rename").unwrap();
    assert_eq!(rename.renamed, 0);
    assert_eq!(rename.unmatched, 1);
    assert_eq!(file_names(&leaf), vec!["Deepa Kumar.img", "OCTA-001_RQ3H.img"]);
}

#[test]
fn revo_missing_root_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    assert!(revo::run(&root.path().join("REVO"), &[]).is_err());
}

#[test]
fn angiovue_unmatched_raw_is_never_deleted() {
    let folder = tempfile::tempdir().unwrap();
    write_raw(&folder.path().join("0001_AS3.raw"), RawGeometry::SMALL);

    let options = AngiovueOptions {
        convert_raw: false,
        ..AngiovueOptions::default()
    };
    let report = angiovue::run(folder.path(), &[], &options).unwrap();
    assert_eq!(report.stage("rename").unwrap().unmatched, 1);
    assert_eq!(file_names(folder.path()), vec!["0001_AS3.raw"]);

    // With conversion the image survives under its converted name
    let report = angiovue::run(folder.path(), &[], &AngiovueOptions::default()).unwrap();
    assert_eq!(report.stage("convert").unwrap().converted, 1);
    assert_eq!(report.stage("rename").unwrap().unmatched, 1);
    assert_eq!(file_names(folder.path()), vec!["0001_AS3.tiff"]);
}

#[test]
fn angiovue_full_run() {
    let folder = tempfile::tempdir().unwrap();
    write_raw(&folder.path().join("0001_AS3.raw"), RawGeometry::SMALL);
    write_raw(&folder.path().join("0001_AD6.raw"), RawGeometry::LARGE);
    fs::write(folder.path().join("0001_AR3.raw"), vec![0u8; 12]).unwrap();
    fs::write(folder.path().join("0001_AS3.png"), b"preview").unwrap();

    let rows = vec![
        row("0001", "Angiovue", "Superficial", "3x3", None, 42),
        row("0001", "Angiovue", "Deep", "6x6", None, 1234),
        row("0001", "Angiovue", "Retina", "3x3", None, 7),
        row("0001", "Revo", "Superficial", "3x3", Some("400x400"), 99),
    ];

    let options = AngiovueOptions {
        format: OutputFormat::Bmp,
        ..AngiovueOptions::default()
    };
    let report = angiovue::run(folder.path(), &rows, &options).unwrap();

    assert_eq!(report.stage("previews").unwrap().deleted, 1);
    let convert = report.stage("convert").unwrap();
    assert_eq!(convert.converted, 2);
    assert_eq!(convert.failed, 1);
    assert_eq!(report.stage("rename").unwrap().renamed, 2);

    // The malformed buffer stays as it was
    assert_eq!(file_names(folder.path()), vec!["0001_AR3.raw", "0042.bmp", "1234.bmp"]);
    assert_eq!(fs::read(folder.path().join("0001_AR3.raw")).unwrap().len(), 12);
}

#[test]
fn spectralis_display_names_are_resolved() {
    let folder = tempfile::tempdir().unwrap();
    fs::write(folder.path().join("Smith John OCTA SVC 3x3 OD.tif"), b"svc").unwrap();
    fs::write(folder.path().join("Doe Jane OCTA DCP 3x3 OS.tif"), b"dcp").unwrap();
    fs::write(folder.path().join("Brown Bob OCTA SVC 3x3 OD.tif"), b"unknown").unwrap();

    let names = vec![
        NameRow {
            given_name: "John".to_string(),
            surname: "Smith".to_string(),
            participant_id: "1001".to_string(),
        },
        NameRow {
            given_name: "Jane".to_string(),
            surname: "Doe".to_string(),
            participant_id: "1002".to_string(),
        },
    ];
    let rows = vec![
        row("1001", "Spectralis", "SVC", "3x3", Some("512x512"), 7),
        row("1002", "Spectralis", "DCP", "3x3", Some("400x400"), 8),
    ];

    let report = spectralis::run(folder.path(), &rows, &names).unwrap();
    let normalize = report.stage("normalize").unwrap();
    assert_eq!(normalize.renamed, 2);
    assert_eq!(normalize.skipped, 1);
    let rename = report.stage("rename").unwrap();
    assert_eq!(rename.renamed, 1);
    assert_eq!(rename.unmatched, 1);

    assert_eq!(
        file_names(folder.path()),
        vec!["0007.tif", "1002_SDCP3.tif", "Brown Bob OCTA SVC 3x3 OD.tif"]
    );
}

#[test]
fn spectralis_collision_keeps_both_files() {
    let folder = tempfile::tempdir().unwrap();
    fs::write(folder.path().join("1001_SSVC3.tif"), b"new").unwrap();
    fs::write(folder.path().join("0007.tif"), b"old").unwrap();

    let rows = vec![row("1001", "Spectralis", "SVC", "3x3", Some("512x512"), 7)];
    let report = spectralis::run(folder.path(), &rows, &[]).unwrap();

    assert_eq!(report.stage("rename").unwrap().failed, 1);
    assert_eq!(report.failures(), 1);
    assert_eq!(fs::read(folder.path().join("0007.tif")).unwrap(), b"old");
    assert_eq!(fs::read(folder.path().join("1001_SSVC3.tif")).unwrap(), b"new");
}

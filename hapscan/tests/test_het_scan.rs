mod common;
use common::{float_column, read_lines, scan_args, TEST_VCF};

use std::path::PathBuf;

use hapscan::args::WindowUnit;
use hapscan::error::Error;
use hapscan::subcommands::het_scan;

#[test]
fn het_snp_windows() {
    let args = scan_args(TEST_VCF, "het_snp", WindowUnit::Snp, &[(4, 4)]);
    het_scan::run(args).unwrap();

    let lines = read_lines(&PathBuf::from(
        "tests/results/het_snp/chr21_test_SNPwindow4_SNPstep4_heterozygosity.csv",
    ));
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "CHROM,POS,S1,S2,S3,S4,Geometric_mean,p10_mean");
    assert!(lines[1].starts_with("chr21,85,"));

    // Positions 10 to 160 with 1, 2, 0 and 2 heterozygous sites
    let s1 = float_column(&lines, 2)[0];
    let s3 = float_column(&lines, 4)[0];
    let geomean = float_column(&lines, 6)[0];
    assert!((s1 - 1.0 / 151.0).abs() < 1e-12);
    assert_eq!(s3, 0.0);
    assert!((geomean - 4f64.powf(1.0 / 3.0) / 151.0).abs() < 1e-12);
}

#[test]
fn het_requires_snp_windows() {
    let args = scan_args(TEST_VCF, "het_bp", WindowUnit::Bp, &[(100, 50)]);
    let err = het_scan::run(args).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::WindowConfig { .. })));
}

mod common;
use common::{read_lines, scan_args, DUPLICATE_PAIRS_VCF, TEST_VCF};

use std::path::PathBuf;

use hapscan::args::WindowUnit;
use hapscan::subcommands::hapcount_scan;

#[test]
fn hapcount_snp_windows() {
    let args = scan_args(TEST_VCF, "hapcount_snp", WindowUnit::Snp, &[(4, 2)]);
    hapcount_scan::run(args).unwrap();

    let res = std::fs::read_to_string(
        "tests/results/hapcount_snp/chr21_test_SNPwindow4_SNPstep2_hap_counts.csv",
    )
    .unwrap();
    insta::assert_snapshot!(res);
}

#[test]
fn hapcount_bp_windows() {
    let args = scan_args(TEST_VCF, "hapcount_bp", WindowUnit::Bp, &[(100, 50)]);
    hapcount_scan::run(args).unwrap();

    let res = std::fs::read_to_string(
        "tests/results/hapcount_bp/chr21_test_BPwindow100_BPstep50_hap_counts.csv",
    )
    .unwrap();
    insta::assert_snapshot!(res);
}

#[test]
fn hapcount_duplicate_pairs() {
    let args = scan_args(DUPLICATE_PAIRS_VCF, "hapcount_pairs", WindowUnit::Snp, &[(6, 6)]);
    hapcount_scan::run(args).unwrap();

    let lines = read_lines(&PathBuf::from(
        "tests/results/hapcount_pairs/duplicate_pairs_SNPwindow6_SNPstep6_hap_counts.csv",
    ));
    assert_eq!(
        lines,
        vec![
            "CHROM,START,END,NUM_uniq_haps,sample_size,SNP_density",
            "chr9,100,151,2,4,0.11764705882352941",
        ]
    );
}

#[test]
fn hapcount_many_files_and_windows() {
    let mut args = scan_args(DUPLICATE_PAIRS_VCF, "hapcount_many", WindowUnit::Snp, &[(6, 6), (2, 1)]);
    args.files.push(PathBuf::from("tests/data/chr9_pairs.vcf.gz"));
    args.prefix = Some("run1".to_string());
    hapscan::subcommands::hapcount_scan::run(args).unwrap();

    let outdir = PathBuf::from("tests/results/hapcount_many");

    // The gzipped copy gives the same rows as the plain text file
    let plain = read_lines(&outdir.join("run1_duplicate_pairs_SNPwindow6_SNPstep6_hap_counts.csv"));
    let gzipped = read_lines(&outdir.join("run1_chr9_pairs_SNPwindow6_SNPstep6_hap_counts.csv"));
    assert_eq!(plain, gzipped);

    // 6 records in windows of 2 sliding by 1
    let lines = read_lines(&outdir.join("run1_chr9_pairs_SNPwindow2_SNPstep1_hap_counts.csv"));
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "chr9,100,111,2,4,0.18181818181818182");
}

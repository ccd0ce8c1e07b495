use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use color_eyre::{eyre::eyre, Result};

use crate::error::Error;
use crate::io::get_input;

const GT_SEPARATOR: char = '|';
// CHROM to FORMAT precede the first sample column
const FIXED_COLUMNS: usize = 9;

/// A phased diploid genotype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genotype(pub [u8; 2]);

impl Genotype {
    pub fn alleles(&self) -> [u8; 2] {
        self.0
    }

    pub fn is_het(&self) -> bool {
        self.0[0] != self.0[1]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub contig: String,
    pub position: u64,
    pub genotypes: Vec<Genotype>,
}

impl VariantRecord {
    pub fn nsamples(&self) -> usize {
        self.genotypes.len()
    }

    pub fn nhaplotypes(&self) -> usize {
        self.genotypes.len() * 2
    }
}

fn parse_allele(allele: &str, line: usize) -> Result<u8> {
    match allele {
        "0" => Ok(0),
        "1" => Ok(1),
        "." => Err(eyre!(Error::Parse {
            line,
            msg: "missing genotypes are not allowed".to_string(),
        })),
        v => Err(eyre!(Error::Parse {
            line,
            msg: format!("allele {v:?} is not biallelic. Normalize alleles using bcftools norm"),
        })),
    }
}

// Only the GT subfield is read, i.e. "0|1" from "0|1:0.98"
pub fn parse_genotype(field: &str, line: usize) -> Result<Genotype> {
    let gt = field.split(':').next().unwrap_or(field);

    let mut alleles = gt.split(GT_SEPARATOR);

    match (alleles.next(), alleles.next(), alleles.next()) {
        (Some(a), Some(b), None) => Ok(Genotype([parse_allele(a, line)?, parse_allele(b, line)?])),
        _ => Err(eyre!(Error::Parse {
            line,
            msg: format!("genotype {gt:?} does not split into two phased alleles"),
        })),
    }
}

/// Parse a tab separated data line: contig in column 1, position in column 2 and genotypes from
/// column 10 onwards
pub fn parse_record(line: &str, line_no: usize) -> Result<VariantRecord> {
    let fields = line
        .trim_end_matches(['\n', '\r'])
        .split('\t')
        .collect::<Vec<&str>>();

    if fields.len() <= FIXED_COLUMNS {
        return Err(eyre!(Error::Parse {
            line: line_no,
            msg: format!(
                "found {} columns, but at least {} are needed for one sample",
                fields.len(),
                FIXED_COLUMNS + 1
            ),
        }));
    }

    let contig = fields[0];
    let position = fields[1];

    let position = position.parse::<u64>().map_err(|_| {
        eyre!(Error::Parse {
            line: line_no,
            msg: format!("position {position:?} is not a non-negative integer"),
        })
    })?;

    let genotypes = fields[FIXED_COLUMNS..]
        .iter()
        .map(|field| parse_genotype(field, line_no))
        .collect::<Result<Vec<Genotype>>>()?;

    Ok(VariantRecord {
        contig: contig.to_string(),
        position,
        genotypes,
    })
}

/// Lazily streams records from a VCF text source. The meta lines and the `#CHROM` line are read
/// on construction, data lines only when iterated.
pub struct VcfReader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    samples: Vec<String>,
    pending: Option<String>,
    last: Option<(String, u64)>,
    finished: bool,
}

impl VcfReader<BufReader<Box<dyn Read>>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let input = get_input(Some(path.to_path_buf()))?;
        Self::new(BufReader::new(input))
    }
}

impl<R: BufRead> VcfReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let mut line_no = 0;
        let mut samples = vec![];
        let mut pending = None;

        for line in lines.by_ref() {
            let line = line?;
            line_no += 1;

            if line.starts_with("##") || line.trim().is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix("#CHROM") {
                samples = header
                    .trim_end()
                    .split('\t')
                    .skip(9)
                    .map(String::from)
                    .collect();
                continue;
            }

            pending = Some(line);
            break;
        }

        tracing::debug!("Read a VCF header with {} samples", samples.len());

        Ok(Self {
            lines,
            line_no,
            samples,
            pending,
            last: None,
            finished: false,
        })
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    fn next_data_line(&mut self) -> Option<Result<(usize, String)>> {
        if let Some(line) = self.pending.take() {
            return Some(Ok((self.line_no, line)));
        }

        for line in self.lines.by_ref() {
            self.line_no += 1;
            match line {
                Ok(line) if line.starts_with('#') || line.trim().is_empty() => continue,
                Ok(line) => return Some(Ok((self.line_no, line))),
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }

    // Without a #CHROM line there is nothing to compare against
    fn check_samples(&self, record: &VariantRecord, line_no: usize) -> Result<()> {
        if !self.samples.is_empty() && record.nsamples() != self.samples.len() {
            return Err(eyre!(Error::Parse {
                line: line_no,
                msg: format!(
                    "found {} genotypes, but the header lists {} samples",
                    record.nsamples(),
                    self.samples.len()
                ),
            }));
        }
        Ok(())
    }

    fn check_order(&mut self, record: &VariantRecord) -> Result<()> {
        if let Some((contig, prev_pos)) = &self.last {
            if contig != &record.contig {
                return Err(eyre!(Error::ContigChanged {
                    prev: contig.clone(),
                    contig: record.contig.clone(),
                    pos: record.position,
                }));
            }

            if *prev_pos > record.position {
                return Err(eyre!(Error::Order {
                    prev_pos: *prev_pos,
                    pos: record.position,
                    contig: record.contig.clone(),
                }));
            }
        }

        self.last = Some((record.contig.clone(), record.position));
        Ok(())
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match self.next_data_line()? {
            Ok((line_no, line)) => parse_record(&line, line_no).and_then(|record| {
                self.check_samples(&record, line_no)?;
                self.check_order(&record)?;
                Ok(record)
            }),
            Err(e) => Err(e),
        };

        // A failed task is not resumed
        if result.is_err() {
            self.finished = true;
        }

        Some(result)
    }
}

use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use ndarray::{Array2, ArrayView1, Axis};

use crate::error::Error;
use crate::read_vcf::VariantRecord;
use crate::windows::Window;

/// Site-major matrix of a window: one row per record, two adjacent columns per sample
pub fn build_site_matrix(records: &[Arc<VariantRecord>]) -> Result<Array2<u8>> {
    let nsamples = records.first().map_or(0, |r| r.nsamples());

    let mut data = Vec::with_capacity(records.len() * nsamples * 2);

    for record in records {
        if record.nsamples() != nsamples {
            return Err(eyre!(Error::Shape {
                pos: record.position,
                expected: nsamples,
                found: record.nsamples(),
            }));
        }

        data.extend(record.genotypes.iter().flat_map(|gt| gt.alleles()));
    }

    Ok(Array2::from_shape_vec((records.len(), nsamples * 2), data)?)
}

/// Haplotype-major matrix, rows are haplotypes and columns the sites of a window
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HaplotypeMatrix {
    data: Array2<u8>,
}

impl HaplotypeMatrix {
    pub fn new(data: Array2<u8>) -> Self {
        Self { data }
    }

    pub fn from_site_matrix(sites: Array2<u8>) -> Self {
        // Owned copy in standard layout so that rows are contiguous
        Self::new(sites.t().as_standard_layout().into_owned())
    }

    pub fn from_window(window: &Window) -> Result<Self> {
        Ok(Self::from_site_matrix(build_site_matrix(&window.records)?))
    }

    pub fn haplotype(&self, idx: usize) -> ArrayView1<'_, u8> {
        self.data.index_axis(Axis(0), idx)
    }

    pub fn haplotypes(&self) -> ndarray::iter::AxisIter<'_, u8, ndarray::Ix1> {
        self.data.axis_iter(Axis(0))
    }

    pub fn nhaplotypes(&self) -> usize {
        self.data.nrows()
    }

    pub fn nsites(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> &Array2<u8> {
        &self.data
    }
}

use std::collections::VecDeque;
use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};

use crate::args::WindowUnit;
use crate::error::Error;
use crate::read_vcf::VariantRecord;

/// An immutable snapshot of the records inside one window.
///
/// Count windows are reported as `[first.position, last.position + 1)`, span windows as the
/// inclusive coordinate range `[start, end]`. `span` is the length the SNP density is computed over.
/// Empty span windows carry the contig of the record that closed them.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub span: u64,
    pub records: Vec<Arc<VariantRecord>>,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn nsites(&self) -> usize {
        self.records.len()
    }

    pub fn snp_density(&self) -> f64 {
        match self.span {
            0 => 0.0,
            span => self.nsites() as f64 / span as f64,
        }
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    pub fn positions(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.position).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowConfig {
    pub unit: WindowUnit,
    pub size: u64,
    pub step: u64,
    pub start: u64,
}

impl WindowConfig {
    pub fn new(unit: WindowUnit, size: u64, step: u64, start: u64) -> Result<Self> {
        if size == 0 || step == 0 {
            return Err(eyre!(Error::WindowConfig {
                msg: format!("window size ({size}) and step ({step}) need to be at least one"),
            }));
        }

        Ok(Self {
            unit,
            size,
            step,
            start,
        })
    }

    /// Slide the windows over a stream of records
    pub fn windows<'a, I>(&self, records: I) -> Box<dyn Iterator<Item = Result<Window>> + 'a>
    where
        I: Iterator<Item = Result<VariantRecord>> + 'a,
    {
        match self.unit {
            WindowUnit::Snp => Box::new(CountWindows::new(
                records,
                self.size as usize,
                self.step as usize,
            )),
            WindowUnit::Bp => Box::new(SpanWindows::new(
                records, self.size, self.step, self.start,
            )),
        }
    }

    pub fn label(&self) -> String {
        let unit = self.unit.to_string();
        format!("{unit}window{}_{unit}step{}", self.size, self.step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountState {
    Filling,
    Ready,
    Draining,
    Done,
}

/// Windows of a fixed number of records sliding by `step` records.
///
/// With `step < size` consecutive windows share `size - step` records, with `step > size` the
/// records in between windows are skipped. A trailing window shorter than `size` is reported only
/// if it contains records no earlier window has reported.
pub struct CountWindows<I> {
    records: I,
    size: usize,
    step: usize,
    buffer: VecDeque<Arc<VariantRecord>>,
    state: CountState,
    unreported: usize,
    skip: usize,
}

impl<I> CountWindows<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    pub fn new(records: I, size: usize, step: usize) -> Self {
        Self {
            records,
            size: size.max(1),
            step: step.max(1),
            buffer: VecDeque::with_capacity(size),
            state: CountState::Filling,
            unreported: 0,
            skip: 0,
        }
    }

    pub fn state(&self) -> CountState {
        self.state
    }

    fn snapshot(&self) -> Window {
        let first = self.buffer.front().map(|r| r.position).unwrap_or_default();
        let last = self.buffer.back().map(|r| r.position).unwrap_or_default();

        Window {
            contig: self.buffer.front().map(|r| r.contig.clone()).unwrap_or_default(),
            start: first,
            end: last + 1,
            span: last + 1 - first,
            records: self.buffer.iter().cloned().collect(),
        }
    }

    fn evict(&mut self) {
        let n = self.step.min(self.buffer.len());
        self.buffer.drain(..n);
        self.skip = self.step - n;
    }
}

impl<I> Iterator for CountWindows<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    type Item = Result<Window>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                CountState::Filling => match self.records.next() {
                    Some(Ok(_)) if self.skip > 0 => self.skip -= 1,
                    Some(Ok(record)) => {
                        self.buffer.push_back(Arc::new(record));
                        self.unreported += 1;

                        if self.buffer.len() == self.size {
                            self.state = CountState::Ready;
                        }
                    }
                    Some(Err(e)) => {
                        self.state = CountState::Done;
                        return Some(Err(e));
                    }
                    None => self.state = CountState::Draining,
                },
                CountState::Ready => {
                    let window = self.snapshot();
                    self.unreported = 0;
                    self.evict();
                    self.state = CountState::Filling;
                    return Some(Ok(window));
                }
                CountState::Draining => {
                    self.state = CountState::Done;
                    if self.unreported > 0 {
                        return Some(Ok(self.snapshot()));
                    }
                }
                CountState::Done => return None,
            }
        }
    }
}

/// Windows spanning `size` basepairs sliding by `step` basepairs.
///
/// Every window between the origin and the last record is reported, also the ones without
/// records, so that scans of different contigs and populations line up. Buffered records always
/// satisfy `win_start <= position <= win_end`.
pub struct SpanWindows<I> {
    records: I,
    size: u64,
    step: u64,
    origin: u64,
    win_start: u64,
    win_end: u64,
    buffer: VecDeque<Arc<VariantRecord>>,
    carry: Option<Arc<VariantRecord>>,
    last_pos: Option<u64>,
    finished: bool,
}

impl<I> SpanWindows<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    pub fn new(records: I, size: u64, step: u64, start: u64) -> Self {
        let size = size.max(1);

        Self {
            records,
            size,
            step: step.max(1),
            origin: start,
            win_start: start,
            win_end: start + size - 1,
            buffer: VecDeque::new(),
            carry: None,
            last_pos: None,
            finished: false,
        }
    }

    fn snapshot(&self) -> Window {
        let contig = self
            .buffer
            .front()
            .or(self.carry.as_ref())
            .map(|r| r.contig.clone())
            .unwrap_or_default();

        Window {
            contig,
            start: self.win_start,
            end: self.win_end,
            span: self.size,
            records: self.buffer.iter().cloned().collect(),
        }
    }

    /// Slide by `step`. A record at exactly the new `win_start` stays, the window being inclusive.
    fn advance(&mut self) {
        self.win_end += self.step;
        self.win_start = self.win_end + 1 - self.size;

        while self
            .buffer
            .front()
            .is_some_and(|r| r.position < self.win_start)
        {
            self.buffer.pop_front();
        }
    }

    fn check_position(&mut self, record: &VariantRecord) -> Result<()> {
        if record.position < self.origin {
            return Err(eyre!(Error::BeforeWindowStart {
                pos: record.position,
                start: self.origin,
            }));
        }

        if let Some(prev_pos) = self.last_pos {
            if prev_pos > record.position {
                return Err(eyre!(Error::Order {
                    prev_pos,
                    pos: record.position,
                    contig: record.contig.clone(),
                }));
            }
        }

        self.last_pos = Some(record.position);
        Ok(())
    }
}

impl<I> Iterator for SpanWindows<I>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    type Item = Result<Window>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(record) = self.carry.take() {
                if record.position > self.win_end {
                    self.carry = Some(record);
                    let window = self.snapshot();
                    self.advance();
                    return Some(Ok(window));
                }

                // Only possible when the step is larger than the window
                if record.position < self.win_start {
                    tracing::debug!(
                        "Record at {} falls between windows, skipping it",
                        record.position
                    );
                } else {
                    self.buffer.push_back(record);
                }
            }

            match self.records.next() {
                Some(Ok(record)) => {
                    if let Err(e) = self.check_position(&record) {
                        self.finished = true;
                        return Some(Err(e));
                    }
                    self.carry = Some(Arc::new(record));
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    return (!self.buffer.is_empty()).then(|| Ok(self.snapshot()));
                }
            }
        }
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;
    use crate::read_vcf::Genotype;

    fn records(positions: &[u64]) -> Vec<Result<VariantRecord>> {
        positions
            .iter()
            .map(|pos| Ok(VariantRecord {
                contig: "chr9".to_string(),
                position: *pos,
                genotypes: vec![Genotype([0, 1])],
            }))
            .collect()
    }

    fn count_windows(positions: &[u64], size: usize, step: usize) -> Vec<Window> {
        CountWindows::new(records(positions).into_iter(), size, step)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn span_windows(positions: &[u64], size: u64, step: u64, start: u64) -> Vec<Window> {
        SpanWindows::new(records(positions).into_iter(), size, step, start)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn count_windows_overlap() {
        let windows = count_windows(&[1, 2, 3, 4, 5], 3, 1);

        let positions: Vec<Vec<u64>> = windows.iter().map(Window::positions).collect();
        assert_eq!(positions, vec![vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5]]);

        // Consecutive windows share size - step records
        for pair in windows.windows(2) {
            let shared = pair[0].positions().iter().filter(|p| pair[1].positions().contains(*p)).count();
            assert_eq!(shared, 2);
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn count_windows_coordinates() {
        let windows = count_windows(&[10, 20, 40, 41], 2, 2);
        assert_eq!(windows.len(), 2);
        assert_eq!((windows[0].start, windows[0].end, windows[0].span), (10, 21, 11));
        assert_eq!((windows[1].start, windows[1].end), (40, 42));
        assert_eq!(windows[1].snp_density(), 1.0);
    }

    #[test]
    fn count_windows_trailing_partial() {
        let windows = count_windows(&[1, 2, 3, 4, 5, 6, 7], 3, 3);
        let positions: Vec<Vec<u64>> = windows.iter().map(Window::positions).collect();
        assert_eq!(positions, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);

        let windows = count_windows(&[1, 2, 3, 4], 10, 5);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].nsites(), 4);

        assert!(count_windows(&[], 3, 1).is_empty());
    }

    #[test]
    fn count_windows_sparse() {
        let windows = count_windows(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 2, 5);
        let positions: Vec<Vec<u64>> = windows.iter().map(Window::positions).collect();
        assert_eq!(positions, vec![vec![1, 2], vec![6, 7]]);
    }

    #[test]
    fn count_windows_states() {
        let mut windows = CountWindows::new(records(&[1, 2]).into_iter(), 2, 1);
        assert_eq!(windows.state(), CountState::Filling);
        assert!(windows.next().unwrap().is_ok());
        assert_eq!(windows.state(), CountState::Filling);
        assert!(windows.next().is_none());
        assert_eq!(windows.state(), CountState::Done);
    }

    #[test]
    fn count_windows_propagate_errors() {
        let mut input = records(&[1, 2]);
        input.push(Err(eyre!(Error::Parse { line: 3, msg: "foo".to_string() })));
        input.extend(records(&[4, 5]));

        let mut windows = CountWindows::new(input.into_iter(), 5, 1);
        assert!(windows.next().unwrap().is_err());
        assert!(windows.next().is_none());
    }

    #[test]
    fn span_windows_emit_empty_windows() {
        let windows = span_windows(&[40, 160], 100, 50, 1);

        let bounds: Vec<(u64, u64)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(bounds, vec![(1, 100), (51, 150), (101, 200)]);

        assert_eq!(windows[0].positions(), vec![40]);
        assert!(windows[1].is_empty());
        assert_eq!(windows[1].contig(), "chr9");
        assert_eq!(windows[1].snp_density(), 0.0);
        assert_eq!(windows[2].positions(), vec![160]);
        assert_eq!(windows[2].snp_density(), 0.01);
    }

    #[test]
    fn span_windows_row_count() {
        // ceil((max_pos - start + 1) / step)
        let windows = span_windows(&[5, 120, 160], 50, 50, 1);
        assert_eq!(windows.len(), 4);

        let windows = span_windows(&[1, 2, 3, 999], 10, 10, 1);
        assert_eq!(windows.len(), 100);
        assert_eq!(windows.iter().filter(|w| w.is_empty()).count(), 98);
    }

    #[test]
    fn span_windows_keep_records_at_window_start() {
        let windows = span_windows(&[51, 120], 100, 50, 1);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].positions(), vec![51]);
        assert_eq!(windows[1].positions(), vec![51, 120]);
        assert_eq!((windows[1].start, windows[1].end), (51, 150));
    }

    #[test]
    fn span_windows_custom_origin() {
        let windows = span_windows(&[1000, 1500], 1000, 500, 1000);
        let bounds: Vec<(u64, u64)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(bounds, vec![(1000, 1999)]);

        let res: Result<Vec<_>> = SpanWindows::new(records(&[40]).into_iter(), 100, 50, 100).collect();
        let err = res.unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::BeforeWindowStart { pos: 40, start: 100 }));
    }

    #[test]
    fn span_windows_sparse() {
        let windows = span_windows(&[5, 15, 18, 25], 10, 20, 1);
        let bounds: Vec<(u64, u64)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(bounds, vec![(1, 10), (21, 30)]);
        assert_eq!(windows[1].positions(), vec![25]);
    }

    #[test]
    fn span_windows_unsorted() {
        let res: Result<Vec<_>> = SpanWindows::new(records(&[40, 30]).into_iter(), 100, 50, 1).collect();
        assert!(res.unwrap_err().downcast_ref::<Error>().unwrap().is_ordering());
    }

    #[test]
    fn window_config() {
        assert!(WindowConfig::new(WindowUnit::Snp, 0, 1, 1).is_err());
        assert!(WindowConfig::new(WindowUnit::Bp, 10, 0, 1).is_err());

        let config = WindowConfig::new(WindowUnit::Bp, 3000, 1500, 1).unwrap();
        assert_eq!(config.label(), "BPwindow3000_BPstep1500");

        let windows: Vec<Window> = config.windows(records(&[10, 4000]).into_iter()).collect::<Result<_>>().unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!((windows[1].start, windows[1].end), (1501, 4500));
    }
}

use crate::{
    error::{Result, SimError},
    stats::SimStatistics,
};
use chrono::Local;
use compass::{MemorySurface, SlotPool};
use csv::{Writer, WriterBuilder};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Timestamped output paths for one run
#[derive(Debug, Clone)]
pub struct OutputFiles {
    dir: PathBuf,
    timestamp: String,
}

impl OutputFiles {
    /// Create `dir` if needed and fix the run timestamp
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| SimError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            timestamp: Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
        })
    }

    fn path(&self, kind: &str, ext: &str) -> PathBuf {
        self.dir
            .join(format!("compass_{kind}_{}.{ext}", self.timestamp))
    }

    pub fn stats(&self) -> PathBuf {
        self.path("stats", "csv")
    }

    pub fn trace(&self) -> PathBuf {
        self.path("trace", "csv")
    }

    pub fn snapshot(&self) -> PathBuf {
        self.path("snapshot", "json")
    }

    pub fn strip(&self) -> PathBuf {
        self.path("strip", "png")
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| SimError::CreateFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

fn csv_writer<W: Write>(writer: W) -> Writer<W> {
    #[allow(unused_mut)]
    let mut builder = WriterBuilder::new();
    #[cfg(windows)]
    {
        use csv::Terminator;
        builder = builder.terminator(Terminator::CRLF);
    }
    builder.from_writer(writer)
}

pub fn export_stats_to_csv(stats: &SimStatistics, path: &Path) -> Result<()> {
    let mut wtr = csv_writer(create_file(path)?);

    wtr.write_record(["Event", "Count"])?;
    for (event, count) in stats.sorted() {
        let count_s = count.to_string();
        wtr.write_record([event, count_s.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Per-frame rows for every active slot
pub struct TraceWriter<W: Write> {
    wtr: Writer<W>,
    rows: usize,
}

impl TraceWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        Self::new(create_file(path)?)
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut wtr = csv_writer(writer);
        wtr.write_record(["frame", "poi", "row", "x", "y", "text", "elevation"])?;
        Ok(Self { wtr, rows: 0 })
    }

    pub fn write_frame(&mut self, frame: u64, pool: &SlotPool<MemorySurface>) -> Result<()> {
        for (slot, poi) in pool.bound_slots() {
            if !pool.is_active(slot) {
                continue;
            }
            let Some(surface) = pool.surface(slot) else {
                continue;
            };
            self.wtr.write_record([
                frame.to_string(),
                poi.0.to_string(),
                slot.row.to_string(),
                format!("{:.2}", surface.x),
                format!("{:.2}", surface.y),
                surface.text.clone(),
                format!("{:?}", surface.elevation),
            ])?;
            self.rows += 1;
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<W> {
        self.wtr.flush()?;
        self.wtr
            .into_inner()
            .map_err(|e| SimError::Io(e.into_error()))
    }
}

//! Raw little-endian buffers
//!
//! Grids travel as headerless row-major arrays; dimensions come from the
//! command line. Elevations are `f32` or `f64`, edge indices `u64`, basin
//! labels `i64`.

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Element type of an elevation buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dtype {
    F32,
    F64,
}

impl Dtype {
    /// Bytes per element
    pub fn width(self) -> usize {
        match self {
            Dtype::F32 => 4,
            Dtype::F64 => 8,
        }
    }

    /// Round a no-data value to what this element type can store.
    ///
    /// `f32` buffers are widened on read, so a sentinel typed in decimal
    /// only matches the stored cells after the same round trip.
    pub fn sentinel(self, nodata: f64) -> f64 {
        match self {
            Dtype::F32 => nodata as f32 as f64,
            Dtype::F64 => nodata,
        }
    }
}

/// Open `path` and return a reader plus the number of `width`-byte elements.
fn open(path: &Path, width: usize) -> Result<(BufReader<File>, usize)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let bytes = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if bytes % width as u64 != 0 {
        bail!(
            "{} is {} bytes, not a multiple of the {}-byte element size",
            path.display(),
            bytes,
            width
        );
    }
    let count = usize::try_from(bytes / width as u64).context("Buffer too large for this platform")?;
    Ok((BufReader::new(file), count))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Read an elevation buffer, widening `f32` to `f64`.
pub fn read_elevations(path: &Path, dtype: Dtype) -> Result<Vec<f64>> {
    let (mut reader, count) = open(path, dtype.width())?;
    let values = match dtype {
        Dtype::F64 => {
            let mut values = vec![0.0_f64; count];
            reader.read_f64_into::<LittleEndian>(&mut values)?;
            values
        }
        Dtype::F32 => {
            let mut narrow = vec![0.0_f32; count];
            reader.read_f32_into::<LittleEndian>(&mut narrow)?;
            narrow.into_iter().map(f64::from).collect()
        }
    };
    Ok(values)
}

/// Write an elevation buffer.
///
/// Narrowing to `f32` is exact for values that were read as `f32`, which
/// holds for filled output since filling only copies existing elevations.
pub fn write_elevations(path: &Path, values: &[f64], dtype: Dtype) -> Result<()> {
    let mut writer = create(path)?;
    for &v in values {
        match dtype {
            Dtype::F64 => writer.write_f64::<LittleEndian>(v)?,
            Dtype::F32 => writer.write_f32::<LittleEndian>(v as f32)?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read a `u64` cell index buffer.
pub fn read_indices(path: &Path) -> Result<Vec<usize>> {
    let (mut reader, count) = open(path, 8)?;
    let mut raw = vec![0_u64; count];
    reader.read_u64_into::<LittleEndian>(&mut raw)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, v)| {
            usize::try_from(v)
                .with_context(|| format!("Index {} at position {} does not fit in usize", v, i))
        })
        .collect()
}

/// Write `i64` basin labels.
pub fn write_labels(path: &Path, labels: &[i64]) -> Result<()> {
    let mut writer = create(path)?;
    for &label in labels {
        writer.write_i64::<LittleEndian>(label)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use topohydro_algorithms::hydrology::priority_flood_in_place;
    use topohydro_core::Raster;

    #[test]
    fn test_elevations_keep_f32_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dem.f32");
        let values = [1.5, -2.25, f64::NAN, 1e6];

        write_elevations(&path, &values, Dtype::F32).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 16);

        let back = read_elevations(&path, Dtype::F32).unwrap();
        assert_eq!(back[0], 1.5);
        assert_eq!(back[1], -2.25);
        assert!(back[2].is_nan());
        assert_eq!(back[3], 1e6);
    }

    #[test]
    fn test_f32_sentinel_survives_fill() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("dem.f32");
        let output = dir.path().join("filled.f32");
        let nd = f32::MIN as f64;
        let values = [5.0, 5.0, 5.0, 5.0, nd, 5.0, 5.0, 5.0, 5.0];
        write_elevations(&input, &values, Dtype::F32).unwrap();

        // FLT_MAX as printed by `%e`, which is not exactly f32::MIN
        let typed: f64 = "-3.40282347e+38".parse().unwrap();
        assert_ne!(typed, nd);
        assert_eq!(Dtype::F32.sentinel(typed), nd);
        assert_eq!(Dtype::F64.sentinel(typed), typed);

        let mut dem = Raster::from_vec(read_elevations(&input, Dtype::F32).unwrap(), 3, 3).unwrap();
        dem.set_nodata(Some(Dtype::F32.sentinel(typed)));
        let report = priority_flood_in_place(&mut dem);
        assert_eq!(report.resolved, 8);
        assert_eq!(report.raised, 0);

        write_elevations(&output, dem.as_slice(), Dtype::F32).unwrap();
        let filled = read_elevations(&output, Dtype::F32).unwrap();
        assert_eq!(filled[4], nd);
        assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
    }

    #[test]
    fn test_elevations_f64_layout_is_little_endian() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dem.f64");
        write_elevations(&path, &[1.0], Dtype::F64).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), 1.0_f64.to_le_bytes());
    }

    #[test]
    fn test_rejects_truncated_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.f64");
        std::fs::write(&path, [0_u8; 12]).unwrap();
        let err = read_elevations(&path, Dtype::F64).unwrap_err();
        assert!(err.to_string().contains("not a multiple"));
    }

    #[test]
    fn test_indices_and_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.u64");
        let bytes: Vec<u8> = [0_u64, 1, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();
        assert_eq!(read_indices(&path).unwrap(), vec![0, 1, 2]);

        let out = dir.path().join("labels.i64");
        write_labels(&out, &[3, -1]).unwrap();
        let raw = std::fs::read(&out).unwrap();
        assert_eq!(&raw[..8], &3_i64.to_le_bytes());
        assert_eq!(&raw[8..], &(-1_i64).to_le_bytes());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_indices(Path::new("/nonexistent/target.u64")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/target.u64"));
    }
}

//! Results container in the netCDF classic format
//!
//! Persisted results are plain netCDF files so that any netCDF tool can open
//! them. The writer produces the classic format (CDF-1); the reader accepts
//! classic and 64-bit-offset (CDF-2) files.
//!
//! Layout written for a result with `n` samples:
//!
//! ```text
//! dimensions:
//!     measurements = n ;
//! variables:
//!     double measurements(measurements) ;
//! // global attributes:
//!     :dataset_name = "<name>" ;
//! ```
//!
//! All integers and floats are big-endian and every name, attribute value and
//! variable body is padded to a 4-byte boundary, as the format requires.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Name of both the dimension and the variable holding the samples.
pub const MEASUREMENTS: &str = "measurements";
/// Name of the global attribute holding the result name.
pub const DATASET_NAME_ATTR: &str = "dataset_name";

const MAGIC: &[u8; 3] = b"CDF";
const VERSION_CLASSIC: u8 = 1;
const VERSION_64BIT_OFFSET: u8 = 2;

const ABSENT: u32 = 0x00;
const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;

/// External data types of the classic format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
enum NcType {
    Byte = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Float = 5,
    Double = 6,
}

impl NcType {
    fn size(self) -> usize {
        match self {
            NcType::Byte | NcType::Char => 1,
            NcType::Short => 2,
            NcType::Int | NcType::Float => 4,
            NcType::Double => 8,
        }
    }
}

impl TryFrom<u32> for NcType {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::Byte),
            2 => Ok(Self::Char),
            3 => Ok(Self::Short),
            4 => Ok(Self::Int),
            5 => Ok(Self::Float),
            6 => Ok(Self::Double),
            _ => Err(Error::Format(format!("unknown nc_type {}", value))),
        }
    }
}

/// The contents of a persisted results file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsFile {
    /// Value of the `dataset_name` global attribute
    pub name: String,
    /// Contents of the `measurements` variable, in file order
    pub measurements: Vec<f64>,
}

impl ResultsFile {
    pub fn new(name: impl Into<String>, measurements: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            measurements,
        }
    }

    /// Read and decode a results file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }

    /// Encode and write a results file, replacing any existing file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.encode()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Encode as a classic-format netCDF byte buffer.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let n = self.measurements.len();
        let vsize = n
            .checked_mul(NcType::Double.size())
            .filter(|&size| size <= i32::MAX as usize)
            .ok_or_else(|| Error::Format(format!("{} measurements do not fit a classic file", n)))?;

        let mut bytes = Vec::with_capacity(128 + self.name.len() + vsize);
        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION_CLASSIC);
        put_u32(&mut bytes, 0); // numrecs

        // dim_list
        put_u32(&mut bytes, NC_DIMENSION);
        put_u32(&mut bytes, 1);
        put_name(&mut bytes, MEASUREMENTS);
        put_u32(&mut bytes, n as u32);

        // gatt_list
        put_u32(&mut bytes, NC_ATTRIBUTE);
        put_u32(&mut bytes, 1);
        put_name(&mut bytes, DATASET_NAME_ATTR);
        put_u32(&mut bytes, NcType::Char as u32);
        put_u32(&mut bytes, self.name.len() as u32);
        put_padded(&mut bytes, self.name.as_bytes());

        // var_list
        put_u32(&mut bytes, NC_VARIABLE);
        put_u32(&mut bytes, 1);
        put_name(&mut bytes, MEASUREMENTS);
        put_u32(&mut bytes, 1); // ndims
        put_u32(&mut bytes, 0); // dimid of `measurements`
        put_u32(&mut bytes, ABSENT); // vatt_list
        put_u32(&mut bytes, 0);
        put_u32(&mut bytes, NcType::Double as u32);
        put_u32(&mut bytes, vsize as u32);

        let begin = bytes.len() + 4;
        put_u32(&mut bytes, begin as u32);

        for value in &self.measurements {
            bytes.extend_from_slice(&value.to_be_bytes());
        }

        Ok(bytes)
    }

    /// Decode a classic or 64-bit-offset netCDF byte buffer.
    ///
    /// Extra dimensions, attributes and variables are ignored. The
    /// `measurements` variable must be one-dimensional `double` data and the
    /// `dataset_name` attribute must be text.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let magic = reader.take(4)?;
        if &magic[..3] != MAGIC {
            return Err(Error::Format("not a netCDF file".into()));
        }
        let version = magic[3];
        if version != VERSION_CLASSIC && version != VERSION_64BIT_OFFSET {
            return Err(Error::Format(format!("unsupported netCDF version {}", version)));
        }

        let _numrecs = reader.u32()?;

        let mut dim_lengths = Vec::new();
        if let Some(count) = reader.list_header(NC_DIMENSION)? {
            for _ in 0..count {
                let _name = reader.name()?;
                dim_lengths.push(reader.u32()? as usize);
            }
        }

        let mut name = None;
        if let Some(count) = reader.list_header(NC_ATTRIBUTE)? {
            for _ in 0..count {
                let attr_name = reader.name()?;
                let (nc_type, values) = reader.attribute_values()?;
                if attr_name == DATASET_NAME_ATTR {
                    if nc_type != NcType::Char {
                        return Err(Error::Format(format!(
                            "attribute `{}` is not text",
                            DATASET_NAME_ATTR
                        )));
                    }
                    let text = String::from_utf8(values.to_vec()).map_err(|_| {
                        Error::Format(format!("attribute `{}` is not UTF-8", DATASET_NAME_ATTR))
                    })?;
                    name = Some(text);
                }
            }
        }

        let mut measurements = None;
        if let Some(count) = reader.list_header(NC_VARIABLE)? {
            for _ in 0..count {
                let var_name = reader.name()?;
                let ndims = reader.u32()? as usize;
                let mut dimids = Vec::with_capacity(ndims.min(16));
                for _ in 0..ndims {
                    dimids.push(reader.u32()? as usize);
                }
                if let Some(attr_count) = reader.list_header(NC_ATTRIBUTE)? {
                    for _ in 0..attr_count {
                        reader.name()?;
                        reader.attribute_values()?;
                    }
                }
                let nc_type = NcType::try_from(reader.u32()?)?;
                let _vsize = reader.u32()?;
                let begin = if version == VERSION_64BIT_OFFSET {
                    reader.u64()?
                } else {
                    reader.u32()? as u64
                };

                if var_name == MEASUREMENTS {
                    measurements =
                        Some(read_measurements(bytes, &dim_lengths, &dimids, nc_type, begin)?);
                }
            }
        }

        let name = name.ok_or_else(|| {
            Error::Format(format!("missing global attribute `{}`", DATASET_NAME_ATTR))
        })?;
        let measurements = measurements
            .ok_or_else(|| Error::Format(format!("missing variable `{}`", MEASUREMENTS)))?;

        Ok(Self { name, measurements })
    }
}

fn read_measurements(
    bytes: &[u8],
    dim_lengths: &[usize],
    dimids: &[usize],
    nc_type: NcType,
    begin: u64,
) -> Result<Vec<f64>> {
    if nc_type != NcType::Double {
        return Err(Error::Format(format!("variable `{}` is not double", MEASUREMENTS)));
    }
    let [dimid] = dimids else {
        return Err(Error::Format(format!(
            "variable `{}` has {} dimensions, expected 1",
            MEASUREMENTS,
            dimids.len()
        )));
    };
    let len = *dim_lengths
        .get(*dimid)
        .ok_or_else(|| Error::Format(format!("unknown dimension id {}", dimid)))?;
    if len == 0 {
        return Err(Error::Format(format!(
            "variable `{}` uses the record dimension",
            MEASUREMENTS
        )));
    }

    let start = usize::try_from(begin).map_err(|_| Error::Format("data offset overflow".into()))?;
    let end = len
        .checked_mul(NcType::Double.size())
        .and_then(|size| start.checked_add(size))
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| Error::Format(format!("variable `{}` data is truncated", MEASUREMENTS)))?;

    Ok(bytes[start..end]
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_be_bytes(raw)
        })
        .collect())
}

fn put_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_be_bytes());
}

fn put_padded(bytes: &mut Vec<u8>, data: &[u8]) {
    bytes.extend_from_slice(data);
    bytes.resize(bytes.len() + padding(data.len()), 0);
}

fn put_name(bytes: &mut Vec<u8>, name: &str) {
    put_u32(bytes, name.len() as u32);
    put_padded(bytes, name.as_bytes());
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Bounds-checked cursor over a header.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::Format(format!("header truncated at byte {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_padded(&mut self, len: usize) -> Result<&'a [u8]> {
        let data = self.take(len)?;
        self.take(padding(len))?;
        Ok(data)
    }

    fn u32(&mut self) -> Result<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let high = self.u32()? as u64;
        let low = self.u32()? as u64;
        Ok((high << 32) | low)
    }

    fn name(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let raw = self.take_padded(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| Error::Format("name is not UTF-8".into()))
    }

    /// Read a list tag; `None` for an absent list, the element count otherwise.
    fn list_header(&mut self, expected: u32) -> Result<Option<usize>> {
        let tag = self.u32()?;
        let count = self.u32()? as usize;
        match tag {
            ABSENT if count == 0 => Ok(None),
            tag if tag == expected => Ok(Some(count)),
            _ => Err(Error::Format(format!(
                "unexpected list tag {:#x} (expected {:#x})",
                tag, expected
            ))),
        }
    }

    fn attribute_values(&mut self) -> Result<(NcType, &'a [u8])> {
        let nc_type = NcType::try_from(self.u32()?)?;
        let nelems = self.u32()? as usize;
        let len = nelems
            .checked_mul(nc_type.size())
            .ok_or_else(|| Error::Format("attribute size overflow".into()))?;
        Ok((nc_type, self.take_padded(len)?))
    }
}

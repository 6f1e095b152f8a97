use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use tracing::warn;

use crate::{Error, Sample, SampleSet};

/// A parsed capture file.
///
/// Layout (little endian):
///
/// | bytes          | content                                    |
/// |----------------|--------------------------------------------|
/// | 4              | total key length, IV included (`i32`)      |
/// | 4              | number of records (`i32`)                  |
/// | `iv_size + 1`  | per record: IV bytes then first output byte |
#[derive(Debug, Clone)]
pub struct Capture {
    pub total_key_length: usize,
    pub declared_samples: usize,
    pub samples: SampleSet,
}

impl Capture {
    pub fn open<P: AsRef<Path>>(path: P, iv_size: usize) -> Result<Self, Error> {
        let mut reader = BufReader::new(File::open(path)?);
        read_capture(&mut reader, iv_size)
    }
}

pub fn read_capture<R: Read>(reader: &mut R, iv_size: usize) -> Result<Capture, Error> {
    let key_length = reader.read_i32::<LE>()?;
    if key_length < iv_size as i32 {
        return Err(Error::KeyLength(key_length));
    }
    let count = reader.read_i32::<LE>()?;
    if count < 0 {
        return Err(Error::Count(count));
    }
    let declared = count as usize;

    let mut samples = SampleSet::new();
    let mut record = vec![0u8; iv_size + 1];
    for read in 0..declared {
        match reader.read_exact(&mut record) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::SampleCount { declared, read });
            }
            Err(e) => return Err(e.into()),
        }
        samples.insert(Sample::from_record(&record, iv_size)?);
    }
    if samples.len() < declared {
        warn!(
            declared,
            unique = samples.len(),
            "capture contains duplicate IVs"
        );
    }

    Ok(Capture {
        total_key_length: key_length as usize,
        declared_samples: declared,
        samples,
    })
}

pub fn write_capture<W: Write>(
    writer: &mut W,
    total_key_length: usize,
    samples: &SampleSet,
) -> Result<(), Error> {
    writer.write_i32::<LE>(total_key_length as i32)?;
    writer.write_i32::<LE>(samples.len() as i32)?;
    for sample in samples {
        writer.write_all(sample.iv())?;
        writer.write_u8(sample.output())?;
    }
    Ok(())
}

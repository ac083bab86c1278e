//! Inflation

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flate2::{Decompress, FlushDecompress, Status};
use tracing::instrument;

const MIN_GROWTH: usize = 4 * 1024;

/// Inflate a zlib stream in memory.
///
/// Loose objects are zlib-wrapped deflate streams, not gzip. The stream must
/// reach its end marker: a download cut short is an error here rather than
/// a silently shorter file.
#[instrument(skip(input), fields(input_size = input.len(), output_size))]
pub fn inflate(input: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = Decompress::new(true);
    let mut output = Vec::with_capacity(input.len().saturating_mul(2).max(MIN_GROWTH));
    loop {
        if output.len() == output.capacity() {
            output.reserve(output.capacity().max(MIN_GROWTH));
        }
        let (in_before, out_before) = (decoder.total_in(), decoder.total_out());
        // total_in never exceeds input.len(), so this can't go out of bounds.
        let consumed = usize::try_from(in_before).or_raise(|| ErrorKind::Inflate)?;
        let status =
            decoder.decompress_vec(&input[consumed..], &mut output, FlushDecompress::None).or_raise(|| ErrorKind::Inflate)?;
        if status == Status::StreamEnd {
            break;
        }
        // There was room to write into and nothing moved: out of input.
        if decoder.total_in() == in_before && decoder.total_out() == out_before {
            exn::bail!(ErrorKind::Incomplete);
        }
    }
    tracing::Span::current().record("output_size", output.len());
    Ok(output)
}

//! Self-describing text and binary encodings of tensors.
//!
//! Both formats record the element kind, rank, sizes, strides, offset and
//! element count, followed by the elements in row-major index order. Loading
//! allocates storage large enough for the recorded layout and scatters the
//! elements back to their strided positions, so the full layout (not only
//! the values) round-trips.
//!
//! Text layout, one field per line:
//!
//! ```text
//! ndblas-tensor 1
//! kind c64
//! rank 2
//! size 2 3
//! stride 3 1
//! offset 0
//! count 6
//! 1 0
//! ...
//! ```
//!
//! The binary layout is the magic `NDBT`, a version byte, a native-endian
//! `u16` byte-order marker, the kind tag, then `u64` rank, sizes, `i64`
//! strides, `u64` offset and count, then element bytes. A stream written on a
//! host of the other byte order is rejected.

use std::io::{Read, Write};

use crate::index::IndexIter;
use crate::storage::{Allocator, Storage};
use crate::tensor::Tensor;
use crate::{extent, ElementKind, Result, Scalar, TensorError};

const TEXT_MAGIC: &str = "ndblas-tensor";
const BINARY_MAGIC: &[u8; 4] = b"NDBT";
const VERSION: u8 = 1;
const BYTE_ORDER_MARK: u16 = 0x0102;

/// Layout recorded in a stream header.
#[derive(Debug)]
struct Header {
    kind: ElementKind,
    size: Vec<usize>,
    stride: Vec<isize>,
    offset: usize,
    count: usize,
}

impl Header {
    fn of<T: Scalar, A: Allocator>(tensor: &Tensor<T, A>) -> Self {
        Self {
            kind: T::KIND,
            size: tensor.size().to_vec(),
            stride: tensor.stride().to_vec(),
            offset: tensor.offset(),
            count: tensor.len(),
        }
    }

    fn check<T: Scalar>(&self) -> Result<()> {
        if self.kind != T::KIND {
            return Err(TensorError::Format(format!(
                "stream holds {} elements, expected {}",
                self.kind,
                T::KIND
            )));
        }
        let expected = element_count(&self.size)
            .ok_or_else(|| TensorError::Format(format!("sizes {:?} overflow", self.size)))?;
        if expected != self.count {
            return Err(TensorError::Format(format!(
                "element count {} does not match sizes {:?}",
                self.count, self.size
            )));
        }
        Ok(())
    }

    /// Tensor with the recorded layout over zeroed storage that covers it.
    fn allocate<T: Scalar>(&self) -> Result<Tensor<T>> {
        let len = if self.count == 0 {
            0
        } else {
            let (min, max) = extent(&self.size, &self.stride, self.offset).map_err(|_| {
                TensorError::Format(format!(
                    "layout of size {:?}, stride {:?}, offset {} overflows",
                    self.size, self.stride, self.offset
                ))
            })?;
            if min < 0 {
                return Err(TensorError::Format(format!(
                    "layout reaches below the start of storage (offset {min})"
                )));
            }
            let limit = isize::MAX as usize / std::mem::size_of::<T>().max(1);
            match (max as usize).checked_add(1) {
                Some(len) if len <= limit => len,
                _ => {
                    return Err(TensorError::Format(format!(
                        "layout spans {max} elements, more than can be allocated"
                    )))
                }
            }
        };
        log::debug!(
            "load: {} tensor of size {:?}, stride {:?}, offset {} into {len} elements",
            self.kind,
            self.size,
            self.stride,
            self.offset
        );
        Tensor::from_storage(Storage::new(len), &self.size, &self.stride, self.offset)
    }
}

/// Product of `size`, or `None` on overflow. Any zero extent gives 0.
fn element_count(size: &[usize]) -> Option<usize> {
    if size.contains(&0) {
        return Some(0);
    }
    size.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

/// Write `values` in row-major order into the recorded positions of `dst`.
fn scatter<T: Scalar>(dst: &Tensor<T>, values: impl Iterator<Item = Result<T>>) -> Result<()> {
    let mut it = IndexIter::begin(dst.size());
    for value in values {
        let coord = it.next().ok_or_else(|| TensorError::Format("too many elements".into()))?;
        dst.set(&coord, value?)?;
    }
    if !it.is_end() {
        return Err(TensorError::Format("truncated element data".into()));
    }
    Ok(())
}

// ============================================================================
// Text
// ============================================================================

pub fn save_text<T: Scalar, A: Allocator, W: Write>(tensor: &Tensor<T, A>, mut out: W) -> Result<()> {
    let header = Header::of(tensor);
    writeln!(out, "{TEXT_MAGIC} {VERSION}")?;
    writeln!(out, "kind {}", header.kind)?;
    writeln!(out, "rank {}", header.size.len())?;
    writeln!(out, "size{}", join(&header.size))?;
    writeln!(out, "stride{}", join(&header.stride))?;
    writeln!(out, "offset {}", header.offset)?;
    writeln!(out, "count {}", header.count)?;
    for x in tensor.iter() {
        writeln!(out, "{}", x.to_text())?;
    }
    out.flush()?;
    Ok(())
}

fn join<V: std::fmt::Display>(values: &[V]) -> String {
    values.iter().map(|v| format!(" {v}")).collect()
}

pub fn load_text<T: Scalar, R: Read>(mut input: R) -> Result<Tensor<T>> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    let mut lines = text.lines();

    let version = field(&mut lines, TEXT_MAGIC)?;
    if version != [VERSION.to_string().as_str()] {
        return Err(TensorError::Format(format!("unsupported version {version:?}")));
    }
    let kind_name = single(field(&mut lines, "kind")?, "kind")?;
    let kind = ElementKind::from_name(kind_name)
        .ok_or_else(|| TensorError::Format(format!("unknown element kind {kind_name:?}")))?;
    let rank: usize = parse(single(field(&mut lines, "rank")?, "rank")?)?;
    let size: Vec<usize> = field(&mut lines, "size")?.into_iter().map(parse).collect::<Result<_>>()?;
    let stride: Vec<isize> = field(&mut lines, "stride")?.into_iter().map(parse).collect::<Result<_>>()?;
    let offset: usize = parse(single(field(&mut lines, "offset")?, "offset")?)?;
    let count: usize = parse(single(field(&mut lines, "count")?, "count")?)?;
    if size.len() != rank || stride.len() != rank {
        return Err(TensorError::Format(format!(
            "rank {rank} with {} sizes and {} strides",
            size.len(),
            stride.len()
        )));
    }

    let header = Header {
        kind,
        size,
        stride,
        offset,
        count,
    };
    header.check::<T>()?;
    let tensor = header.allocate::<T>()?;
    let values = lines.filter(|l| !l.trim().is_empty()).map(|line| {
        T::from_text(line).ok_or_else(|| TensorError::Format(format!("bad element {line:?}")))
    });
    scatter(&tensor, values)?;
    Ok(tensor)
}

fn field<'a>(lines: &mut std::str::Lines<'a>, key: &str) -> Result<Vec<&'a str>> {
    let line = lines
        .next()
        .ok_or_else(|| TensorError::Format(format!("missing `{key}` line")))?;
    let mut words = line.split_whitespace();
    if words.next() != Some(key) {
        return Err(TensorError::Format(format!("expected `{key}`, found {line:?}")));
    }
    Ok(words.collect())
}

fn single<'a>(words: Vec<&'a str>, key: &str) -> Result<&'a str> {
    match words.as_slice() {
        [w] => Ok(*w),
        _ => Err(TensorError::Format(format!("`{key}` expects one value"))),
    }
}

fn parse<V: std::str::FromStr>(word: &str) -> Result<V> {
    word.parse()
        .map_err(|_| TensorError::Format(format!("bad number {word:?}")))
}

// ============================================================================
// Binary
// ============================================================================

pub fn save_binary<T: Scalar, A: Allocator, W: Write>(
    tensor: &Tensor<T, A>,
    mut out: W,
) -> Result<()> {
    let header = Header::of(tensor);
    out.write_all(BINARY_MAGIC)?;
    out.write_all(&[VERSION])?;
    out.write_all(&BYTE_ORDER_MARK.to_ne_bytes())?;
    out.write_all(&[header.kind.tag()])?;
    out.write_all(&(header.size.len() as u64).to_ne_bytes())?;
    for &n in &header.size {
        out.write_all(&(n as u64).to_ne_bytes())?;
    }
    for &s in &header.stride {
        out.write_all(&(s as i64).to_ne_bytes())?;
    }
    out.write_all(&(header.offset as u64).to_ne_bytes())?;
    out.write_all(&(header.count as u64).to_ne_bytes())?;
    for x in tensor.iter() {
        out.write_all(bytemuck::bytes_of(&x.to_pod()))?;
    }
    out.flush()?;
    Ok(())
}

pub fn load_binary<T: Scalar, R: Read>(mut input: R) -> Result<Tensor<T>> {
    let mut magic = [0u8; 4];
    read_exact(&mut input, &mut magic)?;
    if &magic != BINARY_MAGIC {
        return Err(TensorError::Format("not an ndblas binary stream".into()));
    }
    let mut byte = [0u8; 1];
    read_exact(&mut input, &mut byte)?;
    if byte[0] != VERSION {
        return Err(TensorError::Format(format!("unsupported version {}", byte[0])));
    }
    let mut mark = [0u8; 2];
    read_exact(&mut input, &mut mark)?;
    if u16::from_ne_bytes(mark) != BYTE_ORDER_MARK {
        return Err(TensorError::Format("stream byte order differs from host".into()));
    }
    read_exact(&mut input, &mut byte)?;
    let kind = ElementKind::from_tag(byte[0])
        .ok_or_else(|| TensorError::Format(format!("unknown element tag {}", byte[0])))?;

    let rank = read_usize(&mut input)?;
    let size = (0..rank)
        .map(|_| read_usize(&mut input))
        .collect::<Result<Vec<_>>>()?;
    let stride = (0..rank)
        .map(|_| read_i64(&mut input).map(|s| s as isize))
        .collect::<Result<Vec<_>>>()?;
    let offset = read_usize(&mut input)?;
    let count = read_usize(&mut input)?;

    let header = Header {
        kind,
        size,
        stride,
        offset,
        count,
    };
    header.check::<T>()?;
    let tensor = header.allocate::<T>()?;
    let values = (0..count).map(|_| {
        let mut pod = <T::Pod as bytemuck::Zeroable>::zeroed();
        read_exact(&mut input, bytemuck::bytes_of_mut(&mut pod))?;
        Ok(T::from_pod(pod))
    });
    scatter(&tensor, values)?;
    Ok(tensor)
}

/// `read_exact` that reports a short stream as a format error.
fn read_exact<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    input.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => TensorError::Format("unexpected end of stream".into()),
        _ => TensorError::Io(e),
    })
}

fn read_usize<R: Read>(input: &mut R) -> Result<usize> {
    let mut bytes = [0u8; 8];
    read_exact(input, &mut bytes)?;
    usize::try_from(u64::from_ne_bytes(bytes))
        .map_err(|_| TensorError::Format("length exceeds address space".into()))
}

fn read_i64<R: Read>(input: &mut R) -> Result<i64> {
    let mut bytes = [0u8; 8];
    read_exact(input, &mut bytes)?;
    Ok(i64::from_ne_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use num_complex::{Complex32, Complex64};
    use rand::Rng;

    fn assert_same_layout<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) {
        assert_eq!(a.size(), b.size());
        assert_eq!(a.stride(), b.stride());
        assert_eq!(a.offset(), b.offset());
        assert_eq!(a.to_vec(), b.to_vec());
    }

    fn random_view() -> Tensor<f64> {
        let mut rng = rand::thread_rng();
        let base = Tensor::<f64>::from_fn(&[4, 5, 3], |_| rng.gen_range(-1e3..1e3));
        base.transpose(0, 2).unwrap().narrow(1, 1, 3).unwrap()
    }

    #[test]
    fn test_text_roundtrip_strided() {
        let v = random_view();
        let mut buf = Vec::new();
        save_text(&v, &mut buf).unwrap();
        let back: Tensor<f64> = load_text(buf.as_slice()).unwrap();
        assert_same_layout(&v, &back);
    }

    #[test]
    fn test_binary_roundtrip_strided() {
        let v = random_view();
        let mut buf = Vec::new();
        save_binary(&v, &mut buf).unwrap();
        let back: Tensor<f64> = load_binary(buf.as_slice()).unwrap();
        assert_same_layout(&v, &back);
    }

    #[test]
    fn test_complex_roundtrip_is_bit_exact() {
        let z = Tensor::from_vec(
            vec![
                Complex64::new(0.1, -1.0 / 3.0),
                Complex64::new(f64::MAX, f64::MIN_POSITIVE),
            ],
            &[2],
        )
        .unwrap();
        let mut text = Vec::new();
        save_text(&z, &mut text).unwrap();
        assert_eq!(load_text::<Complex64, _>(text.as_slice()).unwrap().to_vec(), z.to_vec());
        let mut bin = Vec::new();
        save_binary(&z, &mut bin).unwrap();
        assert_eq!(load_binary::<Complex64, _>(bin.as_slice()).unwrap().to_vec(), z.to_vec());
    }

    #[test]
    fn test_save_load_is_idempotent() {
        let v = random_view();
        let mut first = Vec::new();
        save_binary(&v, &mut first).unwrap();
        let loaded: Tensor<f64> = load_binary(first.as_slice()).unwrap();
        let mut second = Vec::new();
        save_binary(&loaded, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scalar_and_empty() {
        let s = Tensor::scalar(Complex32::new(1.5, 2.0));
        let mut buf = Vec::new();
        save_text(&s, &mut buf).unwrap();
        let back: Tensor<Complex32> = load_text(buf.as_slice()).unwrap();
        assert_eq!(back.dimension(), 0);
        assert_eq!(back.item().unwrap(), Complex32::new(1.5, 2.0));

        let e = Tensor::<f32>::zeros(&[3, 0]);
        let mut buf = Vec::new();
        save_binary(&e, &mut buf).unwrap();
        let back: Tensor<f32> = load_binary(buf.as_slice()).unwrap();
        assert_eq!(back.size(), &[3, 0]);
    }

    #[test]
    fn test_kind_mismatch() {
        let a = Tensor::<f64>::zeros(&[2]);
        let mut buf = Vec::new();
        save_binary(&a, &mut buf).unwrap();
        let err = load_binary::<f32, _>(buf.as_slice()).unwrap_err();
        assert!(matches!(err, TensorError::Format(_)));
        assert_eq!(err.kind(), ErrorKind::Domain);

        let mut buf = Vec::new();
        save_text(&a, &mut buf).unwrap();
        assert!(load_text::<Complex64, _>(buf.as_slice()).is_err());
    }

    #[test]
    fn test_malformed_streams() {
        assert!(matches!(
            load_binary::<f64, _>(&b"NOPE"[..]),
            Err(TensorError::Format(_))
        ));
        let a = Tensor::<f64>::full(&[4], 1.0);
        let mut buf = Vec::new();
        save_binary(&a, &mut buf).unwrap();
        buf.truncate(buf.len() - 3);
        assert!(matches!(
            load_binary::<f64, _>(buf.as_slice()),
            Err(TensorError::Format(_))
        ));

        let text = "ndblas-tensor 1\nkind f64\nrank 1\nsize 2\nstride 1\noffset 0\ncount 2\n1.0\n";
        assert!(load_text::<f64, _>(text.as_bytes()).is_err());
        let text = "ndblas-tensor 1\nkind f64\nrank 1\nsize 2\nstride 1\noffset 0\ncount 2\n1.0\nx\n";
        assert!(load_text::<f64, _>(text.as_bytes()).is_err());
        let text = "ndblas-tensor 1\nkind f64\nrank 2\nsize 2\nstride 1\noffset 0\ncount 2\n";
        assert!(load_text::<f64, _>(text.as_bytes()).is_err());
    }

    fn binary_header(size: &[u64], stride: &[i64], count: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(BINARY_MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&BYTE_ORDER_MARK.to_ne_bytes());
        buf.push(ElementKind::Real64.tag());
        buf.extend_from_slice(&(size.len() as u64).to_ne_bytes());
        for n in size {
            buf.extend_from_slice(&n.to_ne_bytes());
        }
        for s in stride {
            buf.extend_from_slice(&s.to_ne_bytes());
        }
        buf.extend_from_slice(&0u64.to_ne_bytes());
        buf.extend_from_slice(&count.to_ne_bytes());
        buf
    }

    #[test]
    fn test_oversized_layouts_rejected() {
        // Sizes whose product overflows.
        let buf = binary_header(&[u64::MAX / 2, 4], &[4, 1], 8);
        assert!(matches!(
            load_binary::<f64, _>(buf.as_slice()),
            Err(TensorError::Format(_))
        ));
        // A stride spanning more than can be allocated.
        let buf = binary_header(&[2], &[1 << 60], 2);
        assert!(matches!(
            load_binary::<f64, _>(buf.as_slice()),
            Err(TensorError::Format(_))
        ));
        // A stride whose extent overflows isize.
        let buf = binary_header(&[4], &[i64::MAX / 2], 4);
        assert!(matches!(
            load_binary::<f64, _>(buf.as_slice()),
            Err(TensorError::Format(_))
        ));

        let text = format!(
            "ndblas-tensor 1\nkind f64\nrank 2\nsize {} 4\nstride 4 1\noffset 0\ncount 8\n",
            usize::MAX / 2
        );
        assert!(matches!(
            load_text::<f64, _>(text.as_bytes()),
            Err(TensorError::Format(_))
        ));
        let text = format!(
            "ndblas-tensor 1\nkind f64\nrank 1\nsize 2\nstride {}\noffset 0\ncount 2\n1\n2\n",
            1isize << 60
        );
        assert!(matches!(
            load_text::<f64, _>(text.as_bytes()),
            Err(TensorError::Format(_))
        ));
    }

    #[test]
    fn test_text_header_shape() {
        let a = Tensor::<f32>::from_vec(vec![0.5, 1.0], &[1, 2]).unwrap();
        let mut buf = Vec::new();
        save_text(&a, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "ndblas-tensor 1\nkind f32\nrank 2\nsize 1 2\nstride 2 1\noffset 0\ncount 2\n0.5\n1\n"
        );
    }
}

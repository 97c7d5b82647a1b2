use approx::assert_relative_eq;
use ndblas_view::{math, IndexIter, Storage, Tensor, TensorError};
use num_complex::Complex64;
use rand::Rng;

fn make_tensor(size: &[usize]) -> Tensor<f64> {
    let mut rng = rand::thread_rng();
    Tensor::from_fn(size, |_| rng.gen_range(-1.0..1.0))
}

#[test]
fn test_contiguity_scenario() {
    let storage = Storage::<f64>::new(12);
    let a = Tensor::from_storage(storage, &[3, 4], &[4, 1], 0).unwrap();
    assert!(a.is_contiguous());
    assert!(a.partial_contiguity(0, 1).unwrap());

    let p = a.permute(&[1, 0]).unwrap();
    assert!(!p.is_contiguous());
}

#[test]
fn test_index_iter_scenario() {
    let size = [2, 4, 5];
    let mut it = IndexIter::begin(&size);
    let first = it.coord().to_vec();
    let mut last = first.clone();
    for _ in 0..40 {
        last = it.coord().to_vec();
        it.advance();
    }
    assert_eq!(first, vec![0, 0, 0]);
    assert_eq!(last, vec![1, 3, 4]);
    assert_eq!(it, IndexIter::end(&size));
}

#[test]
fn test_index_iter_visits_every_offset_once() {
    let a = make_tensor(&[3, 5, 2]);
    let p = a.permute(&[2, 0, 1]).unwrap();
    let mut seen = vec![0usize; a.len()];
    for coord in IndexIter::begin(p.size()) {
        let it = IndexIter::from_coord(p.size(), &coord).unwrap();
        let pos = p.offset() as isize + it.offset(p.stride());
        seen[pos as usize] += 1;
    }
    assert!(seen.iter().all(|&n| n == 1));
}

#[test]
fn test_deep_clone_roundtrip() {
    let a = make_tensor(&[4, 6, 3]);
    for view in [
        a.clone(),
        a.transpose(0, 2).unwrap(),
        a.narrow(1, 2, 3).unwrap(),
        a.select(2, 1).unwrap(),
        a.permute(&[1, 2, 0]).unwrap().narrow(0, 1, 4).unwrap(),
    ] {
        let copy = view.deep_clone();
        assert!(copy.is_contiguous());
        assert!(!copy.storage().ptr_eq(view.storage()));
        assert_eq!(copy.size(), view.size());
        for coord in IndexIter::begin(view.size()) {
            assert_eq!(copy.get(&coord).unwrap(), view.get(&coord).unwrap());
        }
    }
}

#[test]
fn test_copy_from_transposed_into_view() {
    let a = make_tensor(&[5, 3]);
    let out = Tensor::<Complex64>::zeros(&[3, 5]);
    out.copy_from(&a.transpose(0, 1).unwrap()).unwrap();
    for i in 0..3 {
        for j in 0..5 {
            assert_eq!(out.get(&[i, j]).unwrap().re, a.get(&[j, i]).unwrap());
        }
    }
}

#[test]
fn test_math_on_permuted_views() {
    let a = make_tensor(&[8, 5]);
    let at = a.permute(&[1, 0]).unwrap();
    let doubled = math::mul_scalar(&at, 2.0);
    for i in 0..5 {
        for j in 0..8 {
            assert_relative_eq!(
                doubled.get(&[i, j]).unwrap(),
                2.0 * a.get(&[j, i]).unwrap(),
                epsilon = 1e-12
            );
        }
    }
    let total = math::sum(&at);
    let expected: f64 = a.to_vec().iter().sum();
    assert_relative_eq!(total, expected, epsilon = 1e-12);
}

#[test]
fn test_reshape_requires_contiguity() {
    let a = make_tensor(&[4, 6]);
    let t = a.transpose(0, 1).unwrap();
    assert!(matches!(
        t.reshape(&[24]),
        Err(TensorError::NonContiguousReshape { .. })
    ));
    let flat = a.reshape(&[24]).unwrap();
    assert_eq!(flat.to_vec(), a.to_vec());
}

use approx::assert_relative_eq;
use ndblas_linalg::batch::{Plan, Traversal};
use ndblas_linalg::{KernelOptions, Linalg, LinalgError, Side, Transpose, UpLo};
use ndblas_view::{IndexIter, Tensor, TrackingAllocator};
use num_complex::Complex64;
use rand::Rng;

fn make_tensor(size: &[usize]) -> Tensor<f64> {
    let mut rng = rand::thread_rng();
    Tensor::from_fn(size, |_| rng.gen_range(-1.0..1.0))
}

fn make_complex(size: &[usize]) -> Tensor<Complex64> {
    let mut rng = rand::thread_rng();
    Tensor::from_fn(size, |_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
}

fn assert_tensor_eq(a: &Tensor<f64>, b: &Tensor<f64>) {
    assert_eq!(a.size(), b.size());
    for (p, q) in a.iter().zip(b.iter()) {
        assert_relative_eq!(p, q, epsilon = 1e-10);
    }
}

#[test]
fn test_dot_length_1000() {
    let la = Linalg::<f64>::new();
    let x = make_tensor(&[1000]);
    let y = make_tensor(&[1000]);
    let d = la.dot(&x, &y).unwrap();
    assert_eq!(d.dimension(), 0);
    let expected: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    assert_relative_eq!(d.item().unwrap(), expected, epsilon = 1e-10);
}

#[test]
fn test_batched_gemm_matches_per_slice() {
    let la = Linalg::<f64>::new();
    let a = make_tensor(&[3, 9, 7, 10]);
    let b = make_tensor(&[3, 9, 10, 9]);
    let c = la.gemm(KernelOptions::new(), 1.0, &a, &b).unwrap();
    assert_eq!(c.size(), &[3, 9, 7, 9]);

    for coord in IndexIter::begin(&[3, 9]) {
        let single = la
            .gemm(
                KernelOptions::new(),
                1.0,
                &a.select_coord(&coord).unwrap(),
                &b.select_coord(&coord).unwrap(),
            )
            .unwrap();
        assert_tensor_eq(&c.select_coord(&coord).unwrap(), &single);
    }
}

#[test]
fn test_fused_and_indexed_traversals_agree() {
    let la = Linalg::<f64>::new();
    let a = make_tensor(&[3, 4, 5, 6]);
    let b = make_tensor(&[3, 4, 6, 2]);
    let fused = la.gemm(KernelOptions::new(), 1.0, &a, &b).unwrap();

    // Same data with a batch that no longer collapses to one step.
    let a_perm = a.permute(&[1, 0, 2, 3]).unwrap().deep_clone().permute(&[1, 0, 2, 3]).unwrap();
    let b_perm = b.permute(&[1, 0, 2, 3]).unwrap().deep_clone().permute(&[1, 0, 2, 3]).unwrap();
    let plan = Plan::new("test", &[3, 4], vec![a_perm.stride()[..2].to_vec()]);
    assert_eq!(plan.traversal(), &Traversal::Indexed);

    let indexed = la.gemm(KernelOptions::new(), 1.0, &a_perm, &b_perm).unwrap();
    assert_tensor_eq(&fused, &indexed);

    // Indexed output as well.
    let c = Tensor::<f64>::zeros(&[4, 3, 5, 2]);
    let mut c_perm = c.permute(&[1, 0, 2, 3]).unwrap();
    la.gemm_into(KernelOptions::new(), 1.0, &a, &b, 0.0, &mut c_perm).unwrap();
    assert_tensor_eq(&fused, &c_perm.deep_clone());
}

#[test]
fn test_level1_batches_over_gapped_views() {
    let la = Linalg::<f64>::new();
    let x = make_tensor(&[4, 6, 8]);
    // Narrowing the middle dimension leaves gaps between batch elements.
    let xs = x.narrow(1, 1, 4).unwrap();
    let ys = make_tensor(&[4, 4, 8]);
    let d = la.dot(&xs, &ys).unwrap();
    for coord in IndexIter::begin(&[4, 4]) {
        let xv = xs.select_coord(&coord).unwrap();
        let yv = ys.select_coord(&coord).unwrap();
        let expected: f64 = xv.iter().zip(yv.iter()).map(|(p, q)| p * q).sum();
        assert_relative_eq!(d.get(&coord).unwrap(), expected, epsilon = 1e-12);
    }
}

#[test]
fn test_mismatch_fails_before_writing() {
    let la = Linalg::<f64>::new();
    let a = make_tensor(&[2, 3, 4]);
    let b = make_tensor(&[2, 4, 5]);
    let mut c = Tensor::full(&[2, 3, 6], 8.0);
    let err = la
        .gemm_into(KernelOptions::new(), 1.0, &a, &b, 1.0, &mut c)
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch { operand: "c", .. }));
    assert!(c.iter().all(|v| v == 8.0));

    let mut y = Tensor::full(&[3, 3], 8.0);
    let x = make_tensor(&[2, 4]);
    assert!(matches!(
        la.gemv_into(KernelOptions::new(), 1.0, &a, &x, 1.0, &mut y),
        Err(LinalgError::BatchMismatch { .. })
    ));
    assert!(y.iter().all(|v| v == 8.0));
}

#[test]
fn test_slice_forms_fail_before_writing() {
    let la = Linalg::<f64>::new();
    let opts = KernelOptions::new();
    let a = Tensor::<f64>::zeros(&[3, 3]);
    let b = Tensor::full(&[2, 2], 5.0);

    let mut out = vec![-1.0; 4];
    assert!(la.trmm_slice(opts, 1.0, &a, &b, &mut out).is_err());
    assert_eq!(out, vec![-1.0; 4]);
    assert!(la.trsm_slice(opts.side(Side::Right), 1.0, &a, &b, &mut out).is_err());
    assert_eq!(out, vec![-1.0; 4]);
    assert!(la.symm_slice(opts, 1.0, &a, &b, 0.0, &mut out).is_err());
    assert_eq!(out, vec![-1.0; 4]);

    // Batch of `a` differs from the batch of `b`.
    let a = Tensor::<f64>::zeros(&[2, 2, 2]);
    let b = Tensor::full(&[3, 2, 2], 5.0);
    let mut out = vec![-1.0; 12];
    assert!(matches!(
        la.trsm_slice(opts, 1.0, &a, &b, &mut out),
        Err(LinalgError::BatchMismatch { .. })
    ));
    assert_eq!(out, vec![-1.0; 12]);

    let a = make_tensor(&[3, 2]);
    let b = make_tensor(&[5, 4]);
    let mut out = vec![-1.0; 12];
    assert!(la.gemm_slice(opts, 1.0, &a, &b, 0.0, &mut out).is_err());
    assert_eq!(out, vec![-1.0; 12]);

    let b = make_tensor(&[3, 4]);
    let mut out = vec![-1.0; 9];
    assert!(la.syr2k_slice(opts, 1.0, &a, &b, 0.0, &mut out).is_err());
    assert_eq!(out, vec![-1.0; 9]);
}

#[test]
fn test_three_conventions_agree() {
    let la = Linalg::<f64>::new();
    let a = make_tensor(&[2, 4, 3]);
    let b = make_tensor(&[2, 4, 5]);
    let opts = KernelOptions::new().trans(Transpose::Trans);

    let fresh = la.gemm(opts, 1.5, &a, &b).unwrap();
    let mut into = Tensor::<f64>::zeros(&[2, 3, 5]);
    la.gemm_into(opts, 1.5, &a, &b, 0.0, &mut into).unwrap();
    let mut buf = vec![0.0; 30];
    la.gemm_slice(opts, 1.5, &a, &b, 0.0, &mut buf).unwrap();

    assert_tensor_eq(&fresh, &into);
    assert_tensor_eq(&fresh, &Tensor::from_vec(buf, &[2, 3, 5]).unwrap());
}

#[test]
fn test_complex_hermitian_family() {
    let la = Linalg::<Complex64>::new();
    let a = make_complex(&[2, 3, 3]);
    let b = make_complex(&[2, 3, 4]);
    let one = Complex64::new(1.0, 0.0);

    // Hermitian matrix from the upper triangle of `a`.
    let herm = Tensor::from_fn(&[2, 3, 3], |i| {
        let (k, r, c) = (i[0], i[1], i[2]);
        if r < c {
            a.get(&[k, r, c]).unwrap()
        } else if r > c {
            a.get(&[k, c, r]).unwrap().conj()
        } else {
            Complex64::new(a.get(&[k, r, r]).unwrap().re, 0.0)
        }
    });
    let hemm = la.hemm(KernelOptions::new(), one, &a, &b).unwrap();
    let gemm = la.gemm(KernelOptions::new(), one, &herm, &b).unwrap();
    for (p, q) in hemm.iter().zip(gemm.iter()) {
        assert_relative_eq!(p.re, q.re, epsilon = 1e-12);
        assert_relative_eq!(p.im, q.im, epsilon = 1e-12);
    }

    let x = make_complex(&[2, 3]);
    let hemv = la.hemv(KernelOptions::new(), one, &a, &x).unwrap();
    let gemv = la.gemv(KernelOptions::new(), one, &herm, &x).unwrap();
    for (p, q) in hemv.iter().zip(gemv.iter()) {
        assert_relative_eq!(p.re, q.re, epsilon = 1e-12);
        assert_relative_eq!(p.im, q.im, epsilon = 1e-12);
    }
}

#[test]
fn test_her2k_lower_matches_definition() {
    let la = Linalg::<Complex64>::new();
    let a = make_complex(&[3, 2]);
    let b = make_complex(&[3, 2]);
    let alpha = Complex64::new(0.5, -1.0);
    let opts = KernelOptions::new().uplo(UpLo::Lower);
    let c = la.her2k(opts, alpha, &a, &b).unwrap();
    let abh = la
        .gemm(KernelOptions::new().trans_b(Transpose::ConjTrans), alpha, &a, &b)
        .unwrap();
    let bah = la
        .gemm(KernelOptions::new().trans_b(Transpose::ConjTrans), alpha.conj(), &b, &a)
        .unwrap();
    for i in 0..3 {
        for j in 0..=i {
            let expected = abh.get(&[i, j]).unwrap() + bah.get(&[i, j]).unwrap();
            let got = c.get(&[i, j]).unwrap();
            assert_relative_eq!(got.re, expected.re, epsilon = 1e-12);
            assert_relative_eq!(got.im, expected.im, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_trsm_right_batched() {
    let la = Linalg::<f64>::new();
    let mut rng = rand::thread_rng();
    let a = Tensor::from_fn(&[2, 3, 3], |i| if i[1] == i[2] { 2.0 } else { rng.gen_range(-1.0..1.0) });
    let x = make_tensor(&[2, 4, 3]);
    let opts = KernelOptions::new().side(Side::Right).trans(Transpose::Trans);
    let b = la.trmm(opts, 1.0, &a, &x).unwrap();
    let solved = la.trsm(opts, 1.0, &a, &b).unwrap();
    assert_tensor_eq(&solved, &x);
}

#[test]
fn test_tracking_allocator_releases_temporaries() {
    let alloc = TrackingAllocator::new();
    {
        let la = Linalg::<f64, TrackingAllocator>::with_allocator(alloc.clone());
        let mut rng = rand::thread_rng();
        let a = Tensor::from_fn_in(&[2, 3, 4], |_| rng.gen_range(-1.0..1.0), alloc.clone());
        let b = Tensor::from_fn_in(&[2, 4, 5], |_| rng.gen_range(-1.0..1.0), alloc.clone());
        let before = alloc.stats().allocations;

        // A transposed output forces a temporary and a write-back.
        let c = Tensor::zeros_in(&[2, 5, 3], alloc.clone());
        let mut ct = c.transpose(1, 2).unwrap();
        la.gemm_into(KernelOptions::new(), 1.0, &a, &b, 0.0, &mut ct).unwrap();
        assert!(alloc.stats().allocations > before + 1);
        assert_eq!(alloc.stats().live_buffers, 3);

        let fresh = la.gemm(KernelOptions::new(), 1.0, &a, &b).unwrap();
        assert_eq!(alloc.stats().live_buffers, 4);
        for (p, q) in fresh.iter().zip(ct.iter()) {
            assert_relative_eq!(p, q, epsilon = 1e-12);
        }

        // Slice results are adopted, never allocated or freed.
        let mut buf = vec![0.0; 30];
        let n = alloc.stats().allocations;
        la.gemm_slice(KernelOptions::new(), 1.0, &a, &b, 0.0, &mut buf).unwrap();
        assert_eq!(alloc.stats().allocations, n);
        assert_eq!(buf, fresh.to_vec());
    }
    assert_eq!(alloc.stats().live_buffers, 0);
    assert_eq!(alloc.stats().live_elements, 0);
}

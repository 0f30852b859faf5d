use std::ffi::c_void;

use tensorptr_common::error::ErrorKind;
use tensorptr_testkit::{buffer::TrackedBuffer, probe::CleanupProbe};
use tensorptr_types::{ScalarType, TensorShapeDynamism};

use super::*;

#[test]
fn test_make_tensor_impl_ptr_contiguous() {
    let mut data = vec![0f32; 24];
    let tensor = make_tensor_impl_ptr(
        vec![2, 3, 4],
        data.as_mut_ptr().cast(),
        vec![],
        vec![],
        ScalarType::Float,
        TensorShapeDynamism::Static,
        None,
    )
    .unwrap();
    assert_eq!(tensor.dim(), 3);
    assert_eq!(tensor.sizes(), &[2, 3, 4]);
    assert_eq!(tensor.strides(), &[12, 4, 1]);
    assert_eq!(tensor.numel(), 24);
    assert_eq!(tensor.nbytes(), 96);
    assert_eq!(tensor.scalar_type(), ScalarType::Float);
    assert_eq!(tensor.data(), data.as_ptr().cast::<c_void>());
    assert!(tensor.is_contiguous());
}

#[test]
fn test_make_tensor_impl_ptr_with_strides() {
    let mut data = vec![0i64; 12];
    let tensor = make_tensor_impl_ptr(
        vec![3, 4],
        data.as_mut_ptr().cast(),
        vec![],
        vec![1, 3],
        ScalarType::Long,
        TensorShapeDynamism::Static,
        None,
    )
    .unwrap();
    assert_eq!(tensor.strides(), &[1, 3]);
    assert!(!tensor.is_contiguous());
}

#[test]
fn test_deleter_runs_once_on_last_drop() {
    let probe = CleanupProbe::new();
    let mut data = vec![0u8; 6];
    let tensor = make_tensor_impl_ptr(
        vec![2, 3],
        data.as_mut_ptr().cast(),
        vec![],
        vec![],
        ScalarType::Byte,
        TensorShapeDynamism::Static,
        Some(probe.deleter()),
    )
    .unwrap();

    let mut clones: Vec<_> = (0..4).map(|_| tensor.clone()).collect();
    drop(tensor);
    while clones.len() > 1 {
        clones.pop();
        assert_eq!(probe.calls(), 0);
    }
    drop(clones);
    assert_eq!(probe.calls(), 1);
    assert_eq!(probe.last_ptr(), data.as_mut_ptr().cast::<c_void>());
}

#[test]
fn test_deleter_receives_current_data_pointer() {
    let probe = CleanupProbe::new();
    let mut first = vec![0u8; 4];
    let mut second = vec![0u8; 4];
    let tensor = make_tensor_impl_ptr(
        vec![4],
        first.as_mut_ptr().cast(),
        vec![],
        vec![],
        ScalarType::Byte,
        TensorShapeDynamism::Static,
        Some(probe.deleter()),
    )
    .unwrap();

    tensor.set_data(second.as_mut_ptr().cast());
    assert_eq!(tensor.mutable_data(), second.as_mut_ptr().cast::<c_void>());
    drop(tensor);
    assert_eq!(probe.calls(), 1);
    assert_eq!(probe.last_ptr(), second.as_mut_ptr().cast::<c_void>());
}

#[test]
fn test_validation_failure_skips_deleter() {
    let probe = CleanupProbe::new();
    let mut data = vec![0u8; 12];
    let err = make_tensor_impl_ptr(
        vec![3, 4],
        data.as_mut_ptr().cast(),
        vec![0, 1],
        vec![1, 3],
        ScalarType::Byte,
        TensorShapeDynamism::Static,
        Some(probe.deleter()),
    )
    .unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err.kind(), ErrorKind::InconsistentStrides { .. }));
    assert_eq!(probe.calls(), 0);
    assert_eq!(probe.live_deleters(), 0);
}

#[test]
fn test_rank_zero() {
    let mut value = 7i32;
    let tensor = make_tensor_impl_ptr(
        vec![],
        (&mut value as *mut i32).cast(),
        vec![],
        vec![],
        ScalarType::Int,
        TensorShapeDynamism::DynamicBound,
        None,
    )
    .unwrap();
    assert_eq!(tensor.dim(), 0);
    assert!(tensor.sizes().is_empty());
    assert!(tensor.strides().is_empty());
    assert_eq!(tensor.numel(), 1);
    assert_eq!(tensor.nbytes(), 4);
}

#[test]
fn test_owned_exact_buffer() {
    let tensor = make_tensor_impl_ptr_owned(
        vec![2, 3],
        vec![0u8; 24],
        vec![],
        vec![],
        ScalarType::Float,
        TensorShapeDynamism::Static,
    )
    .unwrap();
    assert_eq!(tensor.nbytes(), 24);
}

#[test]
fn test_owned_buffer_one_byte_short() {
    let err = make_tensor_impl_ptr_owned(
        vec![2, 3],
        vec![0u8; 23],
        vec![],
        vec![],
        ScalarType::Float,
        TensorShapeDynamism::Static,
    )
    .unwrap_err();
    assert!(err.is_validation());
    match err.kind() {
        ErrorKind::BufferTooSmall { required, actual } => {
            assert_eq!(*required, 24);
            assert_eq!(*actual, 23);
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn test_owned_buffer_larger_than_needed() {
    let tensor = make_tensor_impl_ptr_owned(
        vec![2],
        vec![0u8; 64],
        vec![],
        vec![],
        ScalarType::Double,
        TensorShapeDynamism::Static,
    )
    .unwrap();
    assert_eq!(tensor.nbytes(), 16);
}

#[test]
fn test_owned_buffer_lives_as_long_as_handle() {
    let buffer = TrackedBuffer::zeroed(16);
    let drops = buffer.drop_counter();
    let ptr = buffer.as_ptr();

    let tensor = make_tensor_impl_ptr_owned(
        vec![4],
        buffer,
        vec![],
        vec![],
        ScalarType::Int,
        TensorShapeDynamism::Static,
    )
    .unwrap();
    assert_eq!(tensor.data(), ptr.cast::<c_void>());

    let clone = tensor.clone();
    drop(tensor);
    assert_eq!(drops.get(), 0);
    drop(clone);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_owned_buffer_dropped_on_validation_failure() {
    let buffer = TrackedBuffer::zeroed(16);
    let drops = buffer.drop_counter();
    let err = make_tensor_impl_ptr_owned(
        vec![4],
        buffer,
        vec![0, 0],
        vec![],
        ScalarType::Int,
        TensorShapeDynamism::Static,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::DimOrderLengthMismatch { .. }));
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_from_vec_typed() {
    let tensor = make_tensor_impl_ptr_from_vec(
        vec![2, 2],
        vec![1.0f64, 2.0, 3.0, 4.0],
        vec![],
        vec![],
        TensorShapeDynamism::Static,
    )
    .unwrap();
    assert_eq!(tensor.scalar_type(), ScalarType::Double);
    let values = unsafe { std::slice::from_raw_parts(tensor.data().cast::<f64>(), 4) };
    assert_eq!(values, &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_from_vec_typed_too_small() {
    let err = make_tensor_impl_ptr_from_vec(
        vec![3],
        vec![1u16, 2],
        vec![],
        vec![],
        TensorShapeDynamism::Static,
    )
    .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::BufferTooSmall {
            required: 6,
            actual: 4
        }
    ));
}

#[test]
fn test_from_vec_1d() {
    let tensor = from_vec(vec![true, false, true]).unwrap();
    assert_eq!(tensor.scalar_type(), ScalarType::Bool);
    assert_eq!(tensor.sizes(), &[3]);
    assert_eq!(tensor.strides(), &[1]);
}

#[test]
fn test_handles_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TensorImplPtr>();
}

#[test]
fn test_clones_dropped_on_other_threads() {
    let probe = CleanupProbe::new();
    let owner = from_vec(vec![0u32; 16]).unwrap();
    let data = owner.mutable_data();
    // The view keeps the owning handle alive until its own teardown.
    let deleter: Deleter = {
        let release = probe.deleter();
        Box::new(move |data: *mut c_void| {
            release(data);
            drop(owner);
        })
    };
    let tensor = make_tensor_impl_ptr(
        vec![4, 4],
        data,
        vec![],
        vec![],
        ScalarType::UInt32,
        TensorShapeDynamism::Static,
        Some(deleter),
    )
    .unwrap();

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let tensor = tensor.clone();
            std::thread::spawn(move || tensor.numel())
        })
        .collect();
    drop(tensor);
    for t in threads {
        assert_eq!(t.join().unwrap(), 16);
    }
    assert_eq!(probe.calls(), 1);
}

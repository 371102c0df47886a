//! Integration tests for the typed array bridge.
//!
//! Covers the consistency guarantees between the native view and the engine
//! array: round trips, aliasing, boundary validation and both rejection
//! policies.

use varbridge::{
    BridgeConfig, BridgeError, ConversionError, FromVariant, RejectionPolicy, TypeTag, TypedArray,
    Variant, VariantArray, VariantKind,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn int_tagged(values: &[i64]) -> VariantArray {
    let array = VariantArray::empty(TypeTag::of::<i64>());
    for &value in values {
        array.append(Variant::Int(value));
    }
    array
}

fn string_tagged(values: &[&str]) -> VariantArray {
    let array = VariantArray::empty(TypeTag::of::<String>());
    for &value in values {
        array.append(Variant::from(value));
    }
    array
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_round_trip_after_construction() {
    init_logging();
    let cases: Vec<Vec<i64>> = vec![vec![], vec![0], vec![1, 2, 3], vec![i64::MIN, -1, i64::MAX]];
    for values in cases {
        let array = TypedArray::new(values.clone());
        assert_eq!(array.to_vec(), values);
    }

    let words = TypedArray::new(strings(&["a", "", "ü"]));
    assert_eq!(words.to_vec(), strings(&["a", "", "ü"]));

    let floats = TypedArray::new(vec![0.5f32, -1.25]);
    assert_eq!(&*floats.read_native(), &[0.5, -1.25]);
}

#[test]
fn test_round_trip_after_write_native() {
    let mut array = TypedArray::new(vec![1i32, 2]);
    array.write_native(vec![9, 8, 7]);
    assert_eq!(&*array.read_native(), &[9, 8, 7]);
    assert_eq!(array.read_untyped(), int_tagged(&[9, 8, 7]));

    array.write_native(Vec::new());
    assert!(array.is_empty());
    assert!(array.read_untyped().is_typed());
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_int_bridge_scenario() {
    init_logging();
    let mut array = TypedArray::new(vec![1i64, 2, 3]);

    let untyped = array.read_untyped();
    assert!(untyped.is_typed());
    assert_eq!(untyped.tag(), Some(TypeTag::builtin(VariantKind::Int)));
    assert_eq!(untyped.count(), 3);
    assert_eq!(
        untyped.to_vec(),
        vec![Variant::Int(1), Variant::Int(2), Variant::Int(3)]
    );

    let err = array.write_untyped(string_tagged(&["a"])).unwrap_err();
    assert_eq!(
        err,
        BridgeError::TypeTagMismatch {
            expected: TypeTag::of::<i64>(),
            actual: TypeTag::of::<String>(),
        }
    );
    assert_eq!(&*array.read_native(), &[1, 2, 3]);

    array.write_untyped(int_tagged(&[4, 5])).unwrap();
    assert_eq!(&*array.read_native(), &[4, 5]);
}

#[test]
fn test_empty_string_bridge_scenario() {
    let array = TypedArray::<String>::new(Vec::new());
    let untyped = array.read_untyped();
    assert_eq!(untyped.count(), 0);
    assert!(untyped.is_typed());
    assert!(untyped.is_same_typed(&VariantArray::empty(TypeTag::of::<String>())));
    assert!(!untyped.is_same_typed(&VariantArray::empty(TypeTag::of::<i64>())));
}

// =============================================================================
// Append symmetry and aliasing
// =============================================================================

#[test]
fn test_native_append_is_visible_untyped() {
    let mut array = TypedArray::new(vec![1i64]);
    array.push(2);
    array.native_mut().extend([3, 4]);

    let derived = array.read_untyped().compact_map(i64::try_from_variant);
    assert_eq!(derived, array.to_vec());
    assert_eq!(derived, vec![1, 2, 3, 4]);
}

#[test]
fn test_untyped_append_through_alias_is_visible_native() {
    let array = TypedArray::new(strings(&["x"]));
    let engine_handle = array.read_untyped();
    engine_handle.append(Variant::from("y"));
    engine_handle.set(0, Variant::from("w")).unwrap();

    assert_eq!(array.to_vec(), strings(&["w", "y"]));
    assert_eq!(
        engine_handle.compact_map(String::try_from_variant),
        array.to_vec()
    );
}

#[test]
fn test_copy_does_not_alias() {
    let array = TypedArray::new(vec![true]);
    let copy = array.read_untyped_copy();
    copy.append(Variant::Bool(false));
    assert_eq!(&*array.read_native(), &[true]);
    assert!(copy.is_same_typed(&array.read_untyped()));
}

#[test]
fn test_write_native_detaches_previous_handle() {
    let mut array = TypedArray::new(vec![1i64]);
    let old_handle = array.read_untyped();
    array.write_native(vec![2]);

    old_handle.append(Variant::Int(99));
    assert_eq!(&*array.read_native(), &[2]);
    assert!(!array.read_untyped().ptr_eq(&old_handle));
}

// =============================================================================
// Boundary validation
// =============================================================================

#[test]
fn test_untyped_input_always_rejected() {
    init_logging();
    let mut array = TypedArray::new(vec![1i64]);

    let untyped = VariantArray::from_variants(None, vec![Variant::Int(5)]);
    assert_eq!(
        array.write_untyped(untyped),
        Err(BridgeError::UntypedInput {
            expected: TypeTag::of::<i64>()
        })
    );
    assert_eq!(
        array.write_untyped(VariantArray::untyped()),
        Err(BridgeError::UntypedInput {
            expected: TypeTag::of::<i64>()
        })
    );
    assert_eq!(&*array.read_native(), &[1]);
}

#[test]
fn test_tag_mismatch_rejected_for_every_other_kind() {
    let mut array = TypedArray::new(vec![1.5f64]);
    let before = array.read_untyped();
    for kind in [
        VariantKind::Nil,
        VariantKind::Bool,
        VariantKind::Int,
        VariantKind::String,
        VariantKind::Object,
        VariantKind::Array,
    ] {
        let candidate = VariantArray::empty(TypeTag::builtin(kind));
        assert!(matches!(
            array.write_untyped(candidate),
            Err(BridgeError::TypeTagMismatch { .. })
        ));
        assert_eq!(&*array.read_native(), &[1.5]);
        assert!(array.read_untyped().ptr_eq(&before));
    }
}

#[test]
fn test_mixed_content_rejected_in_full() {
    init_logging();
    let mut array = TypedArray::new(vec![7i64]);

    let candidate = int_tagged(&[1, 2]);
    candidate.append(Variant::Nil);
    candidate.append(Variant::Int(4));

    let err = array.write_untyped(candidate.clone()).unwrap_err();
    assert_eq!(
        err,
        BridgeError::ElementConversionFailure {
            index: 2,
            expected: "int",
            source: ConversionError::TypeMismatch {
                expected: "int",
                actual: "Nil"
            },
        }
    );
    assert_eq!(&*array.read_native(), &[7]);

    // The lenient read path tolerates the same content by skipping it.
    let tolerant = TypedArray::new(Vec::<i64>::new());
    let alias = tolerant.read_untyped();
    for value in candidate.iter() {
        alias.append(value);
    }
    assert_eq!(&*tolerant.read_native(), &[1, 2, 4]);
}

#[test]
fn test_out_of_range_integers_fail_validation() {
    let mut array = TypedArray::new(vec![1u8]);
    let err = array.write_untyped(int_tagged(&[1, 300])).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::ElementConversionFailure {
            index: 1,
            source: ConversionError::IntegerOverflow { value: 300, .. },
            ..
        }
    ));
    assert_eq!(&*array.read_native(), &[1]);
}

#[test]
fn test_validate_does_not_adopt() {
    let array = TypedArray::new(vec![1i64]);
    assert!(array.validate(&int_tagged(&[2, 3])).is_ok());
    assert_eq!(&*array.read_native(), &[1]);
}

#[test]
fn test_accepted_write_shares_candidate() {
    let mut array = TypedArray::new(vec![0i64]);
    let candidate = int_tagged(&[1]);
    array.write_untyped(candidate.clone()).unwrap();
    assert!(array.read_untyped().ptr_eq(&candidate));

    candidate.append(Variant::Int(2));
    assert_eq!(&*array.read_native(), &[1, 2]);
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_write_untyped_of_read_untyped_is_noop() {
    let mut array = TypedArray::new(strings(&["a", "b"]));
    let before = array.to_vec();
    array.write_untyped(array.read_untyped()).unwrap();
    assert_eq!(array.to_vec(), before);

    array.write_untyped(array.read_untyped_copy()).unwrap();
    assert_eq!(array.to_vec(), before);
}

#[test]
fn test_idempotence_with_corrupted_alias() {
    let mut array = TypedArray::new(vec![1i64, 2]);
    array.read_untyped().append(Variant::from("junk"));
    let before = array.to_vec();
    assert_eq!(before, vec![1, 2]);

    assert!(array.write_untyped(array.read_untyped()).is_err());
    assert_eq!(array.to_vec(), before);
}

#[test]
fn test_idempotence_with_corrupted_alias_under_reset_policy() {
    init_logging();
    let config = BridgeConfig::new().with_rejection(RejectionPolicy::ResetToEmpty);
    let mut array = TypedArray::with_config(vec![1i64, 2], config);
    array.read_untyped().append(Variant::from("junk"));
    let before = array.to_vec();

    assert!(array.write_untyped(array.read_untyped()).is_err());
    assert_eq!(array.to_vec(), before);
    assert_eq!(array.read_untyped().count(), 3);

    // A foreign candidate still triggers the reset.
    assert!(array.write_untyped(string_tagged(&["a"])).is_err());
    assert!(array.is_empty());
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_engine_append_visible_while_snapshot_held() {
    let array = TypedArray::new(vec![1i64]);
    let held = array.read_native();

    let alias = array.read_untyped();
    alias.append(Variant::Int(2));

    let fresh = array.read_native();
    assert_eq!(&*held, &[1]);
    assert_eq!(&*fresh, &[1, 2]);
    assert_eq!(fresh.len(), alias.count());
}

#[test]
fn test_leaked_guard_does_not_empty_native_view() {
    let mut array = TypedArray::new(strings(&["a", "b"]));
    std::mem::forget(array.native_mut());
    assert_eq!(array.to_vec(), strings(&["a", "b"]));
    assert_eq!(array.len(), array.read_untyped().count());
}

// =============================================================================
// Rejection policies
// =============================================================================

#[test]
fn test_keep_previous_is_default() {
    let array = TypedArray::<i64>::default();
    assert_eq!(array.config().rejection, RejectionPolicy::KeepPrevious);
}

#[test]
fn test_keep_previous_leaves_both_views() {
    let mut array = TypedArray::new(vec![1i64, 2]);
    let handle = array.read_untyped();

    assert!(array.write_untyped(string_tagged(&["a"])).is_err());
    assert!(array.write_untyped(VariantArray::untyped()).is_err());

    assert!(array.read_untyped().ptr_eq(&handle));
    assert_eq!(handle.count(), 2);
    assert_eq!(&*array.read_native(), &[1, 2]);
}

#[test]
fn test_reset_to_empty_clears_both_views() {
    init_logging();
    let config = BridgeConfig::new().with_rejection(RejectionPolicy::ResetToEmpty);
    let mut array = TypedArray::with_config(vec![1i64, 2], config);
    let handle = array.read_untyped();

    assert!(array.write_untyped(string_tagged(&["a"])).is_err());

    assert!(array.is_empty());
    let untyped = array.read_untyped();
    assert_eq!(untyped.count(), 0);
    assert!(untyped.is_same_typed(&VariantArray::empty(TypeTag::of::<i64>())));
    // The previous container is left alone; only the bridge lets go of it.
    assert_eq!(handle.count(), 2);

    array.write_untyped(int_tagged(&[3])).unwrap();
    assert_eq!(&*array.read_native(), &[3]);
}

#[test]
fn test_policy_can_change_after_construction() {
    let mut array = TypedArray::new(vec![1i64]);
    array.set_config(BridgeConfig::new().with_rejection(RejectionPolicy::ResetToEmpty));
    assert!(array.write_untyped(VariantArray::untyped()).is_err());
    assert!(array.is_empty());
}

// =============================================================================
// Misc
// =============================================================================

#[test]
fn test_from_and_collect() {
    let from_vec: TypedArray<u16> = vec![1, 2].into();
    let collected: TypedArray<u16> = (1..=2).collect();
    assert_eq!(from_vec.to_vec(), collected.to_vec());
    assert_eq!(collected.len(), 2);
}

#[test]
fn test_debug_output_mentions_tag() {
    let array = TypedArray::new(vec![1i64]);
    let debug = format!("{:?}", array);
    assert!(debug.contains("TypedArray"));
    assert!(debug.contains("TypeTag(int)"));
}

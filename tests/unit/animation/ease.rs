use super::*;

const ALL: [Ease; 4] = [Ease::Linear, Ease::EaseIn, Ease::EaseOut, Ease::EaseInOut];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert_eq!(e.apply(1.0), 1.0, "{e:?}");
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    for e in ALL {
        assert_eq!(e.apply(-3.0), 0.0, "{e:?}");
        assert_eq!(e.apply(7.5), 1.0, "{e:?}");
        assert_eq!(e.apply(f64::NAN), 0.0, "{e:?}");
        assert_eq!(e.apply(f64::INFINITY), 1.0, "{e:?}");
    }
}

#[test]
fn curves_are_monotonic() {
    for e in ALL {
        let mut prev = e.apply(0.0);
        for i in 1..=100 {
            let v = e.apply(f64::from(i) / 100.0);
            assert!(v >= prev, "{e:?} decreased at {i}");
            prev = v;
        }
    }
}

#[test]
fn quadratic_shapes() {
    assert_eq!(Ease::EaseIn.apply(0.5), 0.25);
    assert_eq!(Ease::EaseOut.apply(0.5), 0.75);
    assert_eq!(Ease::EaseInOut.apply(0.25), 0.125);
    assert_eq!(Ease::EaseInOut.apply(0.5), 0.5);
    assert_eq!(Ease::EaseInOut.apply(0.75), 0.875);
}

#[test]
fn serde_names_are_kebab_case() {
    let s = serde_json::to_string(&Ease::EaseInOut).unwrap();
    assert_eq!(s, "\"ease-in-out\"");
    let e: Ease = serde_json::from_str("\"ease-out\"").unwrap();
    assert_eq!(e, Ease::EaseOut);
}

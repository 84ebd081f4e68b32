// ByteView integration tests: boundary behavior of the chopping operations
// and whole-view parsing.
use aids::ByteView;

fn sv(s: &str) -> ByteView<'_> {
    ByteView::from(s)
}

#[test]
fn has_prefix_and_suffix() {
    let foo = sv("123456789");
    for n in 0..=9 {
        assert!(foo.has_prefix(sv(&"123456789"[..n])));
        assert!(foo.has_suffix(sv(&"123456789"[9 - n..])));
    }
    assert!(!foo.has_prefix(sv("1234567890")));
    assert!(!foo.has_suffix(sv("0123456789")));
}

// Test: chop_left clamps.
// Verifies: under-chop removes nothing, normal chop splits exactly, over-chop
// consumes the whole view and returns all of it.
#[test]
fn chop_left_boundaries() {
    let mut foo = sv("123456789");
    let bar = foo.chop_left(4);
    assert_eq!(foo, sv("56789"));
    assert_eq!(bar, sv("1234"));

    let mut foo = sv("123456789");
    let bar = foo.chop_left(69);
    assert_eq!(foo, sv(""));
    assert_eq!(bar, sv("123456789"));

    let mut foo = sv("123456789");
    let bar = foo.chop_left(0);
    assert_eq!(foo, sv("123456789"));
    assert_eq!(bar, sv(""));
}

#[test]
fn chop_right_boundaries() {
    let mut foo = sv("123456789");
    let bar = foo.chop_right(5);
    assert_eq!(foo, sv("1234"));
    assert_eq!(bar, sv("56789"));

    let mut foo = sv("123456789");
    let bar = foo.chop_right(69);
    assert_eq!(foo, sv(""));
    assert_eq!(bar, sv("123456789"));

    let mut foo = sv("123456789");
    let bar = foo.chop_right(0);
    assert_eq!(foo, sv("123456789"));
    assert_eq!(bar, sv(""));
}

#[test]
fn as_integer_whole_view() {
    let year = sv("2021");
    let number = year.as_integer::<i32>().expect("decimal") + 1000;
    assert_eq!(number, 3021);
    assert_eq!(sv("2021 ").as_integer::<i32>(), None);
    assert_eq!(sv("18446744073709551615").as_integer::<u64>(), Some(u64::MAX));
    assert_eq!(sv("18446744073709551616").as_integer::<u64>(), None);
}

#[test]
fn views_borrow_without_copying() {
    let text = String::from("alpha beta");
    let mut view = ByteView::from(text.as_str());
    let word = view.chop_word();
    assert_eq!(word.as_bytes().as_ptr(), text.as_ptr());
    assert_eq!(word.to_str(), Some("alpha"));
    assert_eq!(view.trim().to_str(), Some("beta"));
}

use spritewell::prelude::*;

#[test]
fn palette_lifecycle() {
    let mut palette = Palette::new();
    assert!(palette.is_empty());

    palette.push(Color::BLACK, Color::WHITE).unwrap();
    palette
        .push(Color::opaque(1.0, 0.0, 0.0), Color::opaque(0.0, 0.0, 1.0))
        .unwrap();
    assert_eq!(palette.len(), 2);

    // Pairs come back in insertion order.
    assert_eq!(palette.pairs()[0], (Color::BLACK, Color::WHITE));

    assert_eq!(
        palette.pop(),
        Some((Color::opaque(1.0, 0.0, 0.0), Color::opaque(0.0, 0.0, 1.0)))
    );
    assert_eq!(palette.len(), 1);

    palette.clear();
    assert!(palette.is_empty());
    assert_eq!(palette.pop(), None);
}

#[test]
fn palette_capacity_is_a_hard_error() {
    let mut palette = Palette::new();
    for i in 0..MAX_PALETTE_ENTRIES {
        let level = i as f32 / MAX_PALETTE_ENTRIES as f32;
        palette
            .push(Color::opaque(level, level, level), Color::WHITE)
            .unwrap();
    }

    let err = palette.push(Color::BLACK, Color::WHITE).unwrap_err();
    assert_eq!(err, PaletteFull);
    assert_eq!(palette.len(), MAX_PALETTE_ENTRIES);

    // Popping one frees a slot again.
    palette.pop().unwrap();
    palette.push(Color::BLACK, Color::WHITE).unwrap();
    assert_eq!(palette.len(), MAX_PALETTE_ENTRIES);
}

#[test]
fn palettes_share_through_shared_ptr() {
    let palette = shared_ptr(Palette::new());
    let alias = palette.clone();

    alias.borrow_mut().push(Color::BLACK, Color::WHITE).unwrap();
    assert_eq!(palette.borrow().len(), 1);
}

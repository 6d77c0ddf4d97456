use crate::color::Color;
use crate::error::PaletteFull;
use crate::utils::constants::MAX_PALETTE_ENTRIES;
use gl::types::*;

/// An ordered list of ``(key, replacement)`` color pairs, capped at
/// ``MAX_PALETTE_ENTRIES``.
///
/// The pair order is the match-priority order: when a fragment matches more
/// than one key, the earliest pair wins, so duplicate keys are legal and
/// order-sensitive. The structure is deliberately stack-like (append and pop
/// only), not a general mapping.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Palette {
    pairs: Vec<(Color, Color)>,
}

impl Palette {
    /// creates an empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// creates a palette from initial pairs, rejecting oversized input
    pub fn from_pairs(pairs: Vec<(Color, Color)>) -> Result<Self, PaletteFull> {
        if pairs.len() > MAX_PALETTE_ENTRIES {
            return Err(PaletteFull);
        }
        Ok(Self { pairs })
    }

    /// Appends a replacement pair. At capacity the palette is left untouched
    /// and the rejection is reported instead of silently dropped.
    pub fn push(&mut self, key: Color, replacement: Color) -> Result<(), PaletteFull> {
        if self.pairs.len() == MAX_PALETTE_ENTRIES {
            return Err(PaletteFull);
        }
        self.pairs.push((key, replacement));
        Ok(())
    }

    /// removes and returns the most recently added pair
    pub fn pop(&mut self) -> Option<(Color, Color)> {
        self.pairs.pop()
    }

    /// removes all pairs
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// the number of stored pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// the stored pairs, in insertion order
    pub fn pairs(&self) -> &[(Color, Color)] {
        &self.pairs
    }

    /// Unpacks the pairs into the flat layout the shader uniforms take: one
    /// ``[r, g, b, a]`` run per color, insertion order preserved, plus the
    /// vec4 element count.
    pub(crate) fn unpack(&self) -> PaletteUniforms {
        let mut keys = Vec::with_capacity(self.pairs.len() * 4);
        let mut entries = Vec::with_capacity(self.pairs.len() * 4);
        for (key, entry) in &self.pairs {
            keys.extend_from_slice(&[key.r, key.g, key.b, key.a]);
            entries.extend_from_slice(&[entry.r, entry.g, entry.b, entry.a]);
        }
        PaletteUniforms {
            keys,
            entries,
            count: self.pairs.len() as GLint,
        }
    }
}

/// Flattened palette data ready for ``glUniform4fv`` upload.
#[derive(Debug, Default, Clone)]
pub(crate) struct PaletteUniforms {
    pub(crate) keys: Vec<GLfloat>,
    pub(crate) entries: Vec<GLfloat>,
    pub(crate) count: GLint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(level: f32) -> Color {
        Color::opaque(level, level, level)
    }

    #[test]
    fn push_then_pop_restores_sequence() {
        let mut palette = Palette::new();
        palette.push(gray(0.1), gray(0.9)).unwrap();
        palette.push(gray(0.2), gray(0.8)).unwrap();
        let before = palette.pairs().to_vec();

        palette.push(gray(0.3), gray(0.7)).unwrap();
        assert_eq!(palette.pop(), Some((gray(0.3), gray(0.7))));
        assert_eq!(palette.pairs(), before.as_slice());
    }

    #[test]
    fn pop_on_empty_is_none() {
        assert_eq!(Palette::new().pop(), None);
    }

    #[test]
    fn push_at_capacity_rejects_without_corruption() {
        let mut palette = Palette::new();
        for i in 0..MAX_PALETTE_ENTRIES {
            let level = i as f32 / MAX_PALETTE_ENTRIES as f32;
            palette.push(gray(level), gray(1.0 - level)).unwrap();
        }
        let before = palette.pairs().to_vec();

        assert_eq!(palette.push(gray(0.5), gray(0.5)), Err(PaletteFull));
        assert_eq!(palette.len(), MAX_PALETTE_ENTRIES);
        assert_eq!(palette.pairs(), before.as_slice());
    }

    #[test]
    fn from_pairs_respects_capacity() {
        let full = vec![(gray(0.0), gray(1.0)); MAX_PALETTE_ENTRIES];
        assert!(Palette::from_pairs(full.clone()).is_ok());

        let mut oversized = full;
        oversized.push((gray(0.5), gray(0.5)));
        assert_eq!(Palette::from_pairs(oversized).unwrap_err(), PaletteFull);
    }

    #[test]
    fn duplicate_keys_keep_insertion_order() {
        let key = gray(0.5);
        let mut palette = Palette::new();
        palette.push(key, gray(0.1)).unwrap();
        palette.push(key, gray(0.2)).unwrap();

        let unpacked = palette.unpack();
        assert_eq!(unpacked.count, 2);
        // Both runs carry the same key; the first entry run must stay first.
        assert_eq!(&unpacked.entries[0..4], &[0.1, 0.1, 0.1, 1.0]);
        assert_eq!(&unpacked.entries[4..8], &[0.2, 0.2, 0.2, 1.0]);
    }

    #[test]
    fn unpack_layout_is_rgba_runs() {
        let mut palette = Palette::new();
        palette
            .push(Color::new(0.1, 0.2, 0.3, 0.4), Color::new(0.5, 0.6, 0.7, 0.8))
            .unwrap();

        let unpacked = palette.unpack();
        assert_eq!(unpacked.count, 1);
        assert_eq!(unpacked.keys, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(unpacked.entries, vec![0.5, 0.6, 0.7, 0.8]);
    }

    #[test]
    fn clear_resets_len() {
        let mut palette = Palette::new();
        palette.push(gray(0.1), gray(0.9)).unwrap();
        palette.clear();
        assert!(palette.is_empty());
        assert_eq!(palette.unpack().count, 0);
    }
}

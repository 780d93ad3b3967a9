use super::backend::{AutoFilter, Envelope, ToneSpec, Waveform};
use crate::constants::{DEEP_DEPTH, SHALLOW_DEPTH};
use crate::species::Category;

/// Sustained zone timbre for a category and its untransposed note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneVoice {
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub midi: i32,
    pub max_volume_db: f32,
}

pub fn zone_voice(category: Category) -> ZoneVoice {
    match category {
        Category::Mammal => ZoneVoice {
            waveform: Waveform::Sine,
            envelope: Envelope::new(2.0, 1.0, 1.0, 3.0),
            midi: 36, // C2
            max_volume_db: -12.0,
        },
        Category::Cephalopod => ZoneVoice {
            waveform: Waveform::FmSine {
                modulation_index: 8.0,
            },
            envelope: Envelope::new(1.5, 1.0, 1.0, 2.5),
            midi: 56, // G#3
            max_volume_db: -14.0,
        },
        Category::Plant => ZoneVoice {
            waveform: Waveform::Triangle,
            envelope: Envelope::new(3.0, 1.5, 1.0, 4.0),
            midi: 76, // E5
            max_volume_db: -10.0,
        },
        Category::Crustacean => ZoneVoice {
            waveform: Waveform::Square { partials: 5 },
            envelope: Envelope::new(1.8, 1.0, 1.0, 2.0),
            midi: 50, // D3
            max_volume_db: -16.0,
        },
        Category::Fish => ZoneVoice {
            waveform: Waveform::Sawtooth,
            envelope: Envelope::new(2.5, 1.2, 0.9, 3.5),
            midi: 57, // A3
            max_volume_db: -14.0,
        },
    }
}

/// Short cue voice used for center pings.
pub fn ping_voice(category: Category) -> ToneSpec {
    let (waveform, envelope, volume_db) = match category {
        Category::Mammal => (Waveform::Sine, Envelope::new(0.01, 0.6, 0.0, 2.0), -24.0),
        Category::Cephalopod => (
            Waveform::FmSine {
                modulation_index: 8.0,
            },
            Envelope::new(0.005, 0.4, 0.0, 1.5),
            -26.0,
        ),
        Category::Plant => (Waveform::Triangle, Envelope::new(0.005, 0.3, 0.0, 1.2), -22.0),
        Category::Crustacean => (
            Waveform::Square { partials: 3 },
            Envelope::new(0.005, 0.25, 0.0, 1.0),
            -28.0,
        ),
        Category::Fish => (Waveform::Sine, Envelope::new(0.01, 0.8, 0.0, 2.5), -25.0),
    };
    ToneSpec {
        waveform,
        envelope,
        volume_db,
        auto_filter: None,
    }
}

/// Midi pitches a ping may pick from.
pub fn ping_palette(category: Category) -> &'static [i32] {
    match category {
        Category::Mammal => &[50, 57, 62, 65, 69],     // D3 A3 D4 F4 A4
        Category::Cephalopod => &[69, 72, 76, 79, 81], // A4 C5 E5 G5 A5
        Category::Plant => &[74, 77, 81, 84, 86],      // D5 F5 A5 C6 D6
        Category::Crustacean => &[55, 59, 62, 65],     // G3 B3 D4 F4
        Category::Fish => &[52, 55, 59, 62, 64],       // E3 G3 B3 D4 E4
    }
}

/// Shallow species sit an octave up, deep ones an octave down.
#[inline]
pub fn octave_offset(depth: f32) -> i32 {
    if depth < SHALLOW_DEPTH {
        1
    } else if depth > DEEP_DEPTH {
        -1
    } else {
        0
    }
}

/// Shift `midi` by whole octaves, keeping the note-name octave within 0..=8.
pub fn transpose_octaves(midi: i32, octaves: i32) -> i32 {
    let pitch_class = midi.rem_euclid(12);
    let octave = (midi.div_euclid(12) - 1 + octaves).clamp(0, 8);
    (octave + 1) * 12 + pitch_class
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

// Ambient bed: open fifth plus second on D, with a sub on A0.
pub const AMBIENT_PAD_NOTES: [i32; 4] = [26, 33, 40, 47]; // D1 A1 E2 B2
pub const AMBIENT_SUB_NOTE: i32 = 21; // A0

pub fn ambient_pad_voice() -> ToneSpec {
    ToneSpec {
        waveform: Waveform::Sawtooth,
        envelope: Envelope::new(3.0, 2.0, 0.8, 6.0),
        volume_db: -32.0,
        auto_filter: Some(AutoFilter {
            rate_hz: 0.08,
            base_hz: 200.0,
            octaves: 2.0,
            wet: 0.4,
        }),
    }
}

pub fn ambient_sub_voice() -> ToneSpec {
    ToneSpec {
        waveform: Waveform::Sine,
        envelope: Envelope::new(4.0, 3.0, 1.0, 8.0),
        volume_db: -28.0,
        auto_filter: None,
    }
}

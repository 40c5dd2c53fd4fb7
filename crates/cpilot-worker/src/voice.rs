//! Narration voice selection from the strategy profile.

use cpilot_models::{StrategyProfile, VoiceOptions};

/// Pick voice options for a profile.
///
/// German channels get the German neural voice, everything else falls back
/// to the US English one. Delivery style follows the channel tone.
pub fn voice_options_for(profile: &StrategyProfile) -> VoiceOptions {
    let (language_code, voice_name) = match profile.language.as_str() {
        "de" => ("de-DE", "de-DE-Neural2-B"),
        _ => ("en-US", "en-US-Neural2-D"),
    };

    let style = if profile.tone.contains("friendly") {
        "friendly"
    } else {
        "authoritative"
    };

    VoiceOptions {
        language_code: language_code.to_string(),
        voice_name: voice_name.to_string(),
        speaking_rate: 1.0,
        pitch: 0.0,
        style: style.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(language: &str, tone: &str) -> StrategyProfile {
        StrategyProfile {
            language: language.to_string(),
            tone: tone.to_string(),
            ..StrategyProfile::default()
        }
    }

    #[test]
    fn test_german_profile_gets_german_voice() {
        let options = voice_options_for(&profile("de", "informativ"));
        assert_eq!(options.language_code, "de-DE");
        assert_eq!(options.voice_name, "de-DE-Neural2-B");
    }

    #[test]
    fn test_other_languages_fall_back_to_english() {
        for lang in ["en", "fr", ""] {
            let options = voice_options_for(&profile(lang, "neutral"));
            assert_eq!(options.language_code, "en-US");
            assert_eq!(options.voice_name, "en-US-Neural2-D");
        }
    }

    #[test]
    fn test_style_follows_tone() {
        assert_eq!(voice_options_for(&profile("en", "warm and friendly")).style, "friendly");
        assert_eq!(voice_options_for(&profile("en", "expert")).style, "authoritative");
    }

    #[test]
    fn test_neutral_rate_and_pitch() {
        let options = voice_options_for(&profile("de", "friendly"));
        assert_eq!(options.speaking_rate, 1.0);
        assert_eq!(options.pitch, 0.0);
    }
}

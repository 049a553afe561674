use tracing::debug;

use crate::{
    outside::Prompter,
    resolver::QualityTable,
    result::{Error, Result},
    types::MediaKind,
};

const AUDIO: &str = "Audio";
const VIDEO: &str = "Video";
const CANCEL: &str = "Cancel";

/// Ask whether the sound only or the whole video should be saved
pub fn ask_media_kind(prompter: &dyn Prompter) -> Result<MediaKind> {
    let choices = [AUDIO, VIDEO, CANCEL].map(String::from);
    let answer = prompter.ask_list("Choose the file type you want to download", &choices)?;

    match answer.map(|idx| choices[idx].as_str()) {
        Some(AUDIO) => Ok(MediaKind::Audio),
        Some(VIDEO) => Ok(MediaKind::Video),
        _ => Err(Error::Cancelled),
    }
}

/// Ask for one of the resolutions of the table
pub fn ask_quality(prompter: &dyn Prompter, table: &QualityTable) -> Result<String> {
    let mut choices = table.labels();
    choices.push(CANCEL.to_owned());

    let answer = prompter.ask_list("Choose the resolution you want to download", &choices)?;
    match answer.and_then(|idx| table.resolutions.get(idx)) {
        Some(resolution) => {
            debug!("Chose resolution {resolution}");
            Ok(resolution.clone())
        }
        // Either the Cancel entry or a dismissed prompt
        None => Err(Error::Cancelled),
    }
}

/// Ask whether the playlist entries should be numbered in playlist order
pub fn ask_ordered(prompter: &dyn Prompter) -> Result<bool> {
    prompter
        .ask_confirm("Do you want the playlist videos in order?", false)?
        .ok_or(Error::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog, video_meta, Answer, ScriptedPrompter};

    #[test]
    fn media_kind_answers() {
        let prompter = ScriptedPrompter::new([
            Answer::Choice(AUDIO),
            Answer::Choice(VIDEO),
            Answer::Choice(CANCEL),
            Answer::Interrupt,
        ]);
        assert_eq!(ask_media_kind(&prompter).unwrap(), MediaKind::Audio);
        assert_eq!(ask_media_kind(&prompter).unwrap(), MediaKind::Video);
        assert!(matches!(ask_media_kind(&prompter), Err(Error::Cancelled)));
        assert!(matches!(ask_media_kind(&prompter), Err(Error::Cancelled)));
    }

    #[test]
    fn quality_from_the_table() {
        let table = QualityTable::from_video(&video_meta("id", "T", catalog(&["720p", "360p"])));
        let prompter = ScriptedPrompter::new([
            Answer::Choice("720p ~= 1.00 MB"),
            Answer::Choice(CANCEL),
            Answer::Interrupt,
        ]);

        assert_eq!(ask_quality(&prompter, &table).unwrap(), "720p");
        assert!(matches!(ask_quality(&prompter, &table), Err(Error::Cancelled)));
        assert!(matches!(ask_quality(&prompter, &table), Err(Error::Cancelled)));
    }

    #[test]
    fn ordered_confirmation() {
        let prompter = ScriptedPrompter::new([Answer::Confirm(true), Answer::Interrupt]);
        assert!(ask_ordered(&prompter).unwrap());
        assert!(matches!(ask_ordered(&prompter), Err(Error::Cancelled)));
    }
}

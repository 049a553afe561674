//! Fakes of the external collaborators and builders for test data

use std::{
    collections::{HashMap, VecDeque},
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use crate::{
    outside::{MediaMerger, Prompter, StreamProvider},
    progress::ProgressReporter,
    result::{bail, Error, Result},
    types::{PlaylistMetadata, StreamDescriptor, VideoMetadata, VideoRef},
};

pub fn video_stream(resolution: &str, size_bytes: u64) -> StreamDescriptor {
    StreamDescriptor {
        format_id: format!("v{resolution}"),
        resolution: Some(resolution.to_owned()),
        mime_type: "video/mp4".to_owned(),
        extension: "mp4".to_owned(),
        size_bytes,
        is_progressive: false,
        is_audio_only: false,
    }
}

pub fn progressive_stream(resolution: &str, size_bytes: u64) -> StreamDescriptor {
    StreamDescriptor {
        format_id: format!("p{resolution}"),
        is_progressive: true,
        ..video_stream(resolution, size_bytes)
    }
}

pub fn audio_stream(mime_type: &str, size_bytes: u64) -> StreamDescriptor {
    let extension = mime_type.rsplit('/').next().unwrap_or("mp4");
    StreamDescriptor {
        format_id: format!("a{extension}"),
        resolution: None,
        mime_type: mime_type.to_owned(),
        extension: extension.to_owned(),
        size_bytes,
        is_progressive: false,
        is_audio_only: true,
    }
}

pub fn video_ref(id: &str, title: &str) -> VideoRef {
    VideoRef {
        id: id.to_owned(),
        title: title.to_owned(),
        url: VideoRef::watch_url(id),
    }
}

pub fn video_meta(id: &str, title: &str, streams: Vec<StreamDescriptor>) -> VideoMetadata {
    VideoMetadata {
        video: video_ref(id, title),
        streams,
    }
}

/// A usual catalog: two adaptive resolutions and an audio track
pub fn catalog(resolutions: &[&str]) -> Vec<StreamDescriptor> {
    let mut streams: Vec<_> = resolutions
        .iter()
        .map(|res| video_stream(res, 1 << 20))
        .collect();
    streams.push(audio_stream("audio/mp4", 1 << 10));
    streams
}

/// Stream provider serving canned metadata and writing small files on download
#[derive(Default)]
pub struct FakeProvider {
    videos: Vec<VideoMetadata>,
    playlist: Option<PlaylistMetadata>,
    titles: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fail_downloads: bool,
    fetched: Mutex<Vec<String>>,
    downloads: Mutex<Vec<String>>,
}

impl FakeProvider {
    /// Register a video, served for any url containing its id
    pub fn with_video(mut self, meta: VideoMetadata) -> Self {
        self.videos.push(meta);
        self
    }

    /// Register a playlist whose members titles are only known through `fetch_summary`
    pub fn with_playlist(mut self, title: &str, members: &[(&str, &str)]) -> Self {
        let videos = members
            .iter()
            .map(|(id, title)| {
                self.titles.insert(id.to_string(), title.to_string());
                video_ref(id, "")
            })
            .collect::<Vec<_>>();

        self.playlist = Some(PlaylistMetadata {
            title: title.to_owned(),
            length: videos.len(),
            videos,
        });
        self
    }

    /// Make `fetch_summary` of the video sleep before answering
    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_owned(), delay);
        self
    }

    pub fn failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// Urls given to `fetch_video`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Filenames given to `download`, in call order
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl StreamProvider for FakeProvider {
    fn fetch_video(&self, url: &str) -> Result<VideoMetadata> {
        self.fetched.lock().unwrap().push(url.to_owned());
        match self.videos.iter().find(|meta| url.contains(&meta.video.id)) {
            Some(meta) => Ok(meta.clone()),
            None => Err(Error::NoStreamsAvailable(url.to_owned())),
        }
    }

    fn fetch_playlist(&self, url: &str) -> Result<PlaylistMetadata> {
        match &self.playlist {
            Some(playlist) => Ok(playlist.clone()),
            None => bail(format!("No playlist at '{url}'")),
        }
    }

    fn fetch_summary(&self, video: &VideoRef) -> Result<VideoRef> {
        if let Some(delay) = self.delays.get(&video.id) {
            std::thread::sleep(*delay);
        }

        match self.titles.get(&video.id) {
            Some(title) => Ok(VideoRef {
                title: title.clone(),
                ..video.clone()
            }),
            None => bail(format!("Unknown video '{}'", video.id)),
        }
    }

    fn download(
        &self,
        _video: &VideoRef,
        stream: &StreamDescriptor,
        out_dir: &Path,
        filename: &str,
    ) -> Result<()> {
        if self.fail_downloads {
            return bail("connection reset");
        }

        std::fs::write(out_dir.join(filename), &stream.format_id)?;
        self.downloads.lock().unwrap().push(filename.to_owned());
        Ok(())
    }
}

/// Merge tool writing "merged" to the output file
#[derive(Debug, Default)]
pub struct FakeMerger {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeMerger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MediaMerger for FakeMerger {
    fn merge(&self, _video: &Path, _audio: &Path, output: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Merge {
                reason: "exit status: 1".to_owned(),
                leftovers: vec![],
            });
        }

        std::fs::write(output, "merged")?;
        Ok(())
    }
}

/// One scripted answer to a prompt
#[derive(Debug, Clone)]
pub enum Answer {
    /// Pick the list choice with this label
    Choice(&'static str),
    /// Pick the list choice at this index
    Index(usize),
    /// Tick the checkbox choices with these labels
    Select(Vec<&'static str>),
    Confirm(bool),
    Text(String),
    /// Dismiss the prompt, whatever its kind
    Interrupt,
}

/// Prompter answering from a script, panicking on any unexpected question
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.lock().unwrap().is_empty()
    }

    fn next(&self, message: &str) -> Answer {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("No answer left for '{message}'"))
    }
}

fn position(choices: &[String], label: &str) -> usize {
    choices
        .iter()
        .position(|c| c == label)
        .unwrap_or_else(|| panic!("'{label}' is not one of {choices:?}"))
}

impl Prompter for ScriptedPrompter {
    fn ask_list(&self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        match self.next(message) {
            Answer::Choice(label) => Ok(Some(position(choices, label))),
            Answer::Index(idx) => Ok(Some(idx)),
            Answer::Interrupt => Ok(None),
            answer => panic!("{answer:?} does not answer the list '{message}'"),
        }
    }

    fn ask_checkbox(&self, message: &str, choices: &[String]) -> Result<Option<Vec<usize>>> {
        match self.next(message) {
            Answer::Select(labels) => {
                let mut idx: Vec<_> = labels.iter().map(|l| position(choices, l)).collect();
                idx.sort_unstable();
                Ok(Some(idx))
            }
            Answer::Interrupt => Ok(None),
            answer => panic!("{answer:?} does not answer the checkbox '{message}'"),
        }
    }

    fn ask_confirm(&self, message: &str, _default: bool) -> Result<Option<bool>> {
        match self.next(message) {
            Answer::Confirm(yes) => Ok(Some(yes)),
            Answer::Interrupt => Ok(None),
            answer => panic!("{answer:?} does not answer the confirmation '{message}'"),
        }
    }

    fn ask_text(&self, message: &str) -> Result<Option<String>> {
        match self.next(message) {
            Answer::Text(text) => Ok(Some(text)),
            Answer::Interrupt => Ok(None),
            answer => panic!("{answer:?} does not answer the question '{message}'"),
        }
    }
}

/// Progress reporter keeping every event as "begin <task>" or "end <task> ok|failed"
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn begin(&self, task: &str) {
        self.events.lock().unwrap().push(format!("begin {task}"));
    }

    fn end(&self, task: &str, success: bool) {
        let outcome = if success { "ok" } else { "failed" };
        self.events
            .lock()
            .unwrap()
            .push(format!("end {task} {outcome}"));
    }
}

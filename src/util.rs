// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;
use std::time::Duration;

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Formats a sample length as minutes, seconds and milliseconds (`m:ss.mmm`).
pub fn sample_duration_display(duration: Duration) -> String {
    let millis = duration.as_millis();
    let (minutes, rest) = (millis / 60_000, millis % 60_000);
    format!("{}:{:02}.{:03}", minutes, rest / 1000, rest % 1000)
}

#[cfg(test)]
mod test {
    use std::path::Path;
    use std::time::Duration;

    use crate::util::{filename_display, sample_duration_display};

    #[test]
    fn test_filename_display() {
        assert_eq!("kick.aiff", filename_display(Path::new("/samples/drums/kick.aiff")));
        assert_eq!("snare.wav", filename_display(Path::new("snare.wav")));
        assert_eq!("unreadable file name", filename_display(Path::new("/")));
    }

    #[test]
    fn test_sample_duration_display() {
        assert_eq!("0:00.000", sample_duration_display(Duration::ZERO));
        assert_eq!("0:00.250", sample_duration_display(Duration::from_millis(250)));
        // 100 frames at 44.1 kHz.
        assert_eq!("0:00.002", sample_duration_display(Duration::from_secs_f64(100.0 / 44100.0)));
        assert_eq!("0:05.000", sample_duration_display(Duration::from_secs(5)));
        assert_eq!("2:05.125", sample_duration_display(Duration::from_millis(125_125)));
        assert_eq!("60:06.000", sample_duration_display(Duration::from_secs(3606)));
    }
}

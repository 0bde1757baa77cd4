use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use ango_compiler::GeneratedFile;
use tracing::debug;

use crate::error::CliError;

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Force,
    Ask,
}

/// Asks on `output` whether `path` may be replaced. Anything other than
/// `y` or `yes` is a no, including end of input.
pub fn confirm_overwrite<R: BufRead, W: Write>(path: &Path, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{} already exists. Overwrite? [y/N] ", path.display())?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// A file written next to its destination under a hidden name. It replaces
/// the destination on [`Staged::commit`]; dropped uncommitted, it is removed.
struct Staged {
    temp:      PathBuf,
    dest:      PathBuf,
    committed: bool,
}

impl Staged {
    fn write(dest: PathBuf, contents: &str) -> Result<Staged, CliError> {
        let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let temp = dest.with_file_name(format!(".{}.tmp", name));
        if let Err(source) = fs::write(&temp, contents) {
            let _ = fs::remove_file(&temp);
            return Err(CliError::Write { path: temp, source });
        }
        Ok(Staged { temp, dest, committed: false })
    }

    fn commit(mut self) -> Result<PathBuf, CliError> {
        fs::rename(&self.temp, &self.dest).map_err(|source| CliError::Write {
            path: self.dest.clone(),
            source,
        })?;
        self.committed = true;
        Ok(self.dest.clone())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Writes `files` below `dir`, creating it if needed, and asks on stdin
/// before replacing existing files. Returns the paths written.
pub fn write_files(dir: &Path, files: &[GeneratedFile], overwrite: Overwrite) -> Result<Vec<PathBuf>, CliError> {
    let stdin = io::stdin();
    write_files_with(dir, files, overwrite, &mut stdin.lock(), &mut io::stdout())
}

/// Writes a target's files as a unit. Every overwrite is confirmed before
/// anything is written, and all files are staged before any is renamed into
/// place, so a declined prompt or a failed write leaves `dir` as it was.
pub fn write_files_with<R: BufRead, W: Write>(
    dir: &Path,
    files: &[GeneratedFile],
    overwrite: Overwrite,
    input: &mut R,
    output: &mut W,
) -> Result<Vec<PathBuf>, CliError> {
    let paths: Vec<PathBuf> = files.iter().map(|file| dir.join(&file.path)).collect();
    if overwrite == Overwrite::Ask {
        for path in paths.iter().filter(|path| path.exists()) {
            let confirmed = confirm_overwrite(path, input, output)
                .map_err(|source| CliError::Read { path: PathBuf::from("<stdin>"), source })?;
            if !confirmed {
                return Err(CliError::OverwriteDeclined(path.clone()));
            }
        }
    }

    fs::create_dir_all(dir).map_err(|source| CliError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let staged = files
        .iter()
        .zip(paths)
        .map(|(file, path)| Staged::write(path, &file.contents))
        .collect::<Result<Vec<_>, _>>()?;

    let mut written = Vec::with_capacity(staged.len());
    for (file, staged) in files.iter().zip(staged) {
        let path = staged.commit()?;
        debug!(path = %path.display(), bytes = file.contents.len(), "wrote generated file");
        written.push(path);
    }
    Ok(written)
}

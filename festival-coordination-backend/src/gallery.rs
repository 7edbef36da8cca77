use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];

#[derive(thiserror::Error, Debug)]
pub enum GalleryError {
    #[error("folder parameter is required")]
    MissingFolder,
    #[error("invalid folder {0:?}")]
    InvalidFolder(String),
    #[error("folder {0:?} does not exist")]
    NotFound(String),
    #[error("failed to read gallery folder {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[must_use]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| extension.eq_ignore_ascii_case(allowed))
        })
}

/// Maps a web folder such as `/images/ganpati/` onto a directory below
/// `public_root`. Only plain path segments are accepted.
fn resolve(public_root: &Path, folder: &str) -> Result<PathBuf, GalleryError> {
    let relative = Path::new(folder.trim_start_matches('/'));
    let mut resolved = public_root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(GalleryError::InvalidFolder(folder.to_owned()))
            }
        }
    }
    Ok(resolved)
}

fn io_error(path: &Path, source: std::io::Error) -> GalleryError {
    GalleryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Image files directly in `dir`, plus the subdirectories found there.
async fn scan(dir: &Path) -> Result<(Vec<String>, Vec<(String, PathBuf)>), std::io::Error> {
    let mut images = Vec::new();
    let mut subdirectories = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            subdirectories.push((name, entry.path()));
        } else if file_type.is_file() && is_image(Path::new(&name)) {
            images.push(name);
        }
    }
    Ok((images, subdirectories))
}

/// Web paths of the images in `folder` and one level of subfolders, sorted.
pub async fn list_images(public_root: &Path, folder: Option<&str>) -> Result<Vec<String>, GalleryError> {
    let folder = folder
        .map(str::trim)
        .filter(|folder| !folder.is_empty())
        .ok_or(GalleryError::MissingFolder)?;
    let dir = resolve(public_root, folder)?;
    let prefix = if folder.ends_with('/') {
        folder.to_owned()
    } else {
        format!("{folder}/")
    };

    let (images, subdirectories) = match scan(&dir).await {
        Ok(found) => found,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(GalleryError::NotFound(folder.to_owned()))
        }
        Err(err) => return Err(io_error(&dir, err)),
    };

    let mut paths: Vec<String> = images.into_iter().map(|name| format!("{prefix}{name}")).collect();
    for (name, path) in subdirectories {
        let (nested, _) = scan(&path).await.map_err(|err| io_error(&path, err))?;
        paths.extend(nested.into_iter().map(|image| format!("{prefix}{name}/{image}")));
    }
    paths.sort();
    debug!("found {} images in {folder}", paths.len());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_matched_case_insensitively() {
        assert!(is_image(Path::new("a.JPG")));
        assert!(is_image(Path::new("b.webp")));
        assert!(!is_image(Path::new("c.txt")));
        assert!(!is_image(Path::new("jpg")));
    }

    #[test]
    fn traversal_is_rejected() {
        let root = Path::new("/srv/public");
        assert!(matches!(
            resolve(root, "/images/../../etc"),
            Err(GalleryError::InvalidFolder(_))
        ));
        assert_eq!(
            resolve(root, "/images/ganpati/").unwrap(),
            PathBuf::from("/srv/public/images/ganpati")
        );
    }

    #[tokio::test]
    async fn missing_folder_parameter() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_images(root.path(), Some("  ")).await,
            Err(GalleryError::MissingFolder)
        ));
        assert!(matches!(
            list_images(root.path(), Some("/nowhere")).await,
            Err(GalleryError::NotFound(_))
        ));
    }
}

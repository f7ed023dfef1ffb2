//! Input forms and their validation rules.

use quill_common::{AppError, AppResult};
use validator::{Validate, ValidationError};

/// Form for creating or editing a post.
#[derive(Debug, Clone, Validate, serde::Deserialize)]
pub struct PostForm {
    /// Post text. Whitespace-only text is rejected.
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,

    /// Slug of the group to post into, if any. An empty string means
    /// no group, matching how HTML select fields submit "no choice".
    #[serde(default)]
    pub group: Option<String>,

    /// Drop the post's existing image. Ignored when a replacement image
    /// is uploaded alongside it, and on create.
    #[serde(default)]
    pub clear_image: bool,
}

impl PostForm {
    /// Group slug with the empty-string sentinel normalized away.
    #[must_use]
    pub fn group_slug(&self) -> Option<&str> {
        self.group.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Form for adding a comment to a post.
#[derive(Debug, Clone, Validate, serde::Deserialize)]
pub struct CommentForm {
    /// Comment text. Whitespace-only text is rejected.
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
}

/// Form for registering a new account.
#[derive(Debug, Clone, Validate, serde::Deserialize)]
pub struct SignupForm {
    /// Username, unique case-insensitively.
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,

    /// Plain-text password; hashed before storage.
    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// An image file uploaded alongside a post.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name from the multipart field.
    pub file_name: String,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Sniff the image format from the file bytes and return its
    /// canonical extension. Non-image payloads are rejected.
    pub fn extension(&self) -> AppResult<&'static str> {
        let format = image::guess_format(&self.data)
            .map_err(|_| AppError::Validation("Uploaded file is not a valid image".to_string()))?;
        match format {
            image::ImageFormat::Jpeg => Ok("jpg"),
            image::ImageFormat::Png => Ok("png"),
            image::ImageFormat::Gif => Ok("gif"),
            image::ImageFormat::WebP => Ok("webp"),
            _ => Err(AppError::Validation(
                "Unsupported image format".to_string(),
            )),
        }
    }

    /// MIME type matching the sniffed format.
    pub fn mime_type(&self) -> AppResult<&'static str> {
        Ok(match self.extension()? {
            "jpg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "image/webp",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_rejects_blank_text() {
        let form = PostForm {
            text: "   \n\t ".to_string(),
            group: None,
            clear_image: false,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_post_form_accepts_text() {
        let form = PostForm {
            text: "Hello world".to_string(),
            group: None,
            clear_image: false,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_post_form_empty_group_is_none() {
        let form = PostForm {
            text: "Hello".to_string(),
            group: Some(String::new()),
            clear_image: false,
        };
        assert!(form.group_slug().is_none());
    }

    #[test]
    fn test_comment_form_rejects_blank_text() {
        let form = CommentForm {
            text: String::new(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_signup_form_rejects_short_password() {
        let form = SignupForm {
            username: "leo".to_string(),
            password: "short".to_string(),
            name: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_signup_form_rejects_bad_username() {
        let form = SignupForm {
            username: "bad name!".to_string(),
            password: "long-enough-password".to_string(),
            name: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_image_upload_sniffs_png() {
        // Minimal PNG magic bytes.
        let data = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        let upload = ImageUpload {
            file_name: "photo.png".to_string(),
            content_type: Some("image/png".to_string()),
            data,
        };
        assert_eq!(upload.extension().unwrap(), "png");
    }

    #[test]
    fn test_image_upload_rejects_garbage() {
        let upload = ImageUpload {
            file_name: "notes.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            data: b"just some text".to_vec(),
        };
        assert!(upload.extension().is_err());
    }
}

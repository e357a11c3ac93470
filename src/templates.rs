//! Fixed reStructuredText shapes for module pages and package indexes.

/// A library name whose index pages get a human-readable heading instead of
/// the escaped package segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHeading {
    pub library: String,
    pub heading: String,
}

impl RootHeading {
    pub fn new(library: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            heading: heading.into(),
        }
    }
}

/// Escapes underscores so the heading renders literally.
pub fn escape_title(name: &str) -> String {
    name.replace('_', r"\_")
}

fn last_segment(qualname: &str) -> &str {
    qualname.rsplit('.').next().unwrap_or(qualname)
}

fn heading(title: &str) -> String {
    format!("{title}\n{}", "=".repeat(title.chars().count()))
}

pub fn module_template(module_qualname: &str) -> String {
    let title = escape_title(last_segment(module_qualname));
    format!(
        "{}\n\n.. automodule:: {module_qualname}\n   :members:\n   :undoc-members:\n",
        heading(&title)
    )
}

pub fn index_template(
    package_qualname: &str,
    doc_references: &[String],
    root_heading: Option<&RootHeading>,
) -> String {
    let dirname = last_segment(package_qualname);
    let title = match root_heading {
        Some(root) if root.library == dirname => root.heading.clone(),
        _ => escape_title(dirname),
    };

    let mut content = heading(&title);
    if !doc_references.is_empty() {
        content.push('\n');
        for reference in doc_references {
            content.push_str(&format!("\n* :doc:`{reference}`"));
        }
        content.push('\n');
    }
    content
}

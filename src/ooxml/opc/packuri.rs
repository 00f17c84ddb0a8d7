/// The PackURI value type: the name of a part inside an OPC package.
///
/// Partnames always begin with a forward slash and use forward slashes as
/// separators. Slide, layout and master partnames are "tuple" partnames whose
/// filename ends in a sequence number (`/ppt/slides/slide3.xml`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI, rejecting strings that do not begin with `/`.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Build a tuple partname from a template containing a single `%d`.
    ///
    /// ```
    /// use slidekit::ooxml::opc::PackURI;
    /// let uri = PackURI::from_template("/ppt/slides/slide%d.xml", 12).unwrap();
    /// assert_eq!(uri.as_str(), "/ppt/slides/slide12.xml");
    /// ```
    pub fn from_template(template: &str, n: u32) -> Result<Self, String> {
        let (head, tail) = template
            .split_once("%d")
            .ok_or_else(|| format!("partname template has no %d: '{}'", template))?;
        let mut digits = itoa::Buffer::new();
        let num = digits.format(n);

        let mut uri = String::with_capacity(head.len() + num.len() + tail.len());
        uri.push_str(head);
        uri.push_str(num);
        uri.push_str(tail);
        Self::new(uri)
    }

    /// Resolve a relative reference (e.g. `../slideLayouts/slideLayout1.xml`)
    /// against a base URI (e.g. `/ppt/slides`).
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(Self::normalize(&joined))
    }

    /// Directory portion, e.g. `/ppt/slides` for `/ppt/slides/slide1.xml`.
    ///
    /// The package pseudo-partname and top-level parts have base URI `/`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Filename portion, e.g. `slide1.xml`. Empty for `/`.
    pub fn filename(&self) -> &str {
        self.uri.rsplit_once('/').map_or("", |(_, name)| name)
    }

    /// Extension without the leading period, e.g. `xml`.
    pub fn ext(&self) -> &str {
        self.filename().rsplit_once('.').map_or("", |(_, ext)| ext)
    }

    /// Sequence number of a tuple partname, `None` for singleton partnames.
    ///
    /// `/ppt/slides/slide21.xml` gives `Some(21)`, `/ppt/presentation.xml`
    /// gives `None`.
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
        let name = stem.trim_end_matches(|c: char| c.is_ascii_digit());
        if name.is_empty() || name.len() == stem.len() {
            return None;
        }
        atoi_simd::parse::<u32>(stem[name.len()..].as_bytes()).ok()
    }

    /// Zip member name for this part (the URI without its leading slash).
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Reference to this part relative to `base_uri`, as written in `.rels`.
    ///
    /// `/ppt/slideLayouts/slideLayout1.xml` relative to `/ppt/slides` is
    /// `../slideLayouts/slideLayout1.xml`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = Vec::with_capacity(from.len() - common + to.len() - common);
        segments.extend(std::iter::repeat_n("..", from.len() - common));
        segments.extend_from_slice(&to[common..]);
        segments.join("/")
    }

    /// PackURI of the `.rels` part holding this part's relationships.
    ///
    /// `/ppt/slides/slide1.xml` maps to `/ppt/slides/_rels/slide1.xml.rels`,
    /// and the package pseudo-partname `/` maps to `/_rels/.rels`.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base = self.base_uri().trim_end_matches('/');
        Self::new(format!("{}/_rels/{}.rels", base, self.filename()))
    }

    /// Full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Collapse `.` and `..` segments and duplicate slashes.
    fn normalize(path: &str) -> String {
        let mut stack: Vec<&str> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {},
                ".." => {
                    stack.pop();
                },
                other => stack.push(other),
            }
        }
        format!("/{}", stack.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

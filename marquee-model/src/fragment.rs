/// One unparsed listing as handed over by the page extraction layer.
///
/// Both parts are optional because listings on the source page are not
/// guaranteed to carry either element. `info` is the hyphen separated
/// `category - rating - length` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFragment {
    pub title: Option<String>,
    pub info: Option<String>,
}

impl RawFragment {
    pub fn new(title: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            info: Some(info.into()),
        }
    }

    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            info: None,
        }
    }
}

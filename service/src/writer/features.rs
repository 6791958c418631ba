use bitflags::bitflags;

bitflags! {
    /// Optional parts of a written mapping document.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WriterFeatures: u8 {
        /// Freeze panes below the transformation table header.
        const FREEZE_HEADERS = 0b0001;
        /// Autofilter on the transformation table.
        const ADD_FILTERS = 0b0010;
        /// Leading `Version Control` sheet.
        const VERSION_CONTROL = 0b0100;
        /// Apply the template's conditional row rules.
        const ROW_STYLING = 0b1000;

        /// All features enabled (default).
        const ALL = Self::FREEZE_HEADERS.bits()
                  | Self::ADD_FILTERS.bits()
                  | Self::VERSION_CONTROL.bits()
                  | Self::ROW_STYLING.bits();

        /// No features (plain tables).
        const NONE = 0b0000;
    }
}

impl Default for WriterFeatures {
    fn default() -> Self {
        Self::ALL
    }
}

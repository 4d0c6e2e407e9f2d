use crate::domain::ListingRecord;

/// Where raw scraped listings come from
pub trait ListingInputPort {
    fn read_listings(&mut self) -> anyhow::Result<Vec<ListingRecord>>;
}

/// Where cleaned listings go
pub trait ListingOutputPort {
    fn write_listing(&mut self, record: &ListingRecord) -> anyhow::Result<()>;

    /// Flush anything buffered; called once after the last record
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

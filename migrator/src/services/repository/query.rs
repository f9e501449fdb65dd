/// Projection applied to every source record: the full document plus the
/// dereferenced asset documents of `mainImage` and `icon`.
pub const RECORD_PROJECTION: &str = r#"{
    ...,
    content{
      main{
        title,
        slug,
        summaryHeadline,
        summaryText,
        mainImage{
          asset->{
            _id,
            url,
            _ref,
            metadata {
              dimensions,
              lqip,
              palette
            }
          }
        },
        icon{
          asset->{
            _id,
            url,
            _ref,
            metadata {
              dimensions,
              lqip,
              palette
            }
          }
        },
        gallery,
      },
      meta,
    },
    language,
    orderRank
  }"#;

/// One page of records of type `$type` with `_id > $after`, ordered by id.
pub fn build_page_query(limit: usize) -> String {
    format!(
        "*[_type == $type && _id > $after] | order(_id asc) [0...{}]{}",
        limit, RECORD_PROJECTION
    )
}

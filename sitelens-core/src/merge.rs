use sitelens_types::{LensError, NormalizedRecord, ProviderKey, QueryKind};

/// Merge records from several providers in priority order (first is highest).
///
/// - Each field takes the first known value across the inputs.
/// - Uninformative records are skipped and never become the source.
/// - The returned source is the first provider that contributed a known value.
///
/// Returns `Ok(None)` when no input is informative.
///
/// # Errors
/// Returns `InvalidArg` if any input record is not of `kind`.
pub fn merge_records_by_priority<I>(
    kind: QueryKind,
    records: I,
) -> Result<Option<(NormalizedRecord, ProviderKey)>, LensError>
where
    I: IntoIterator<Item = (ProviderKey, NormalizedRecord)>,
{
    let mut merged = NormalizedRecord::unknown(kind);
    let mut source: Option<ProviderKey> = None;
    for (key, record) in records {
        if record.kind() != kind {
            return Err(LensError::InvalidArg(format!(
                "{key} produced a {} record for a {kind} query",
                record.kind()
            )));
        }
        if !record.is_informative() {
            continue;
        }
        merged.merge_from(&record)?;
        source.get_or_insert(key);
    }
    Ok(source.map(|s| (merged, s)))
}

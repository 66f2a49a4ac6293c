//! Cross-page consistency checks
//!
//! The catalog can change between any two requests. Each check compares what a page reports
//! now with what earlier pages reported, so drift aborts the crawl instead of being merged
//! into the output.

use crate::crawler::analyzer::PageInfo;
use crate::crawler::coordinator::PageLayout;
use crate::ValidationError;

/// The page must report the total fixed by the first page
///
/// Growth and shrinkage are treated the same way.
pub fn check_total(expected: u64, info: &PageInfo) -> Result<(), ValidationError> {
    if info.total != expected {
        return Err(ValidationError::TotalMismatch {
            expected,
            actual: info.total,
        });
    }
    Ok(())
}

/// The page must start right after the previous one (or at 1 for the first page)
pub fn check_continuation(
    previous: Option<&PageInfo>,
    info: &PageInfo,
) -> Result<(), ValidationError> {
    let expected = previous.map_or(1, |prev| prev.end + 1);
    if info.start != expected {
        return Err(ValidationError::RangeGap {
            expected,
            actual: info.start,
        });
    }
    Ok(())
}

/// The page must cover exactly the range it covered during discovery
pub fn check_layout(
    discovered: Option<&PageLayout>,
    info: &PageInfo,
) -> Result<(), ValidationError> {
    match discovered {
        Some(layout) if layout.info.range() == info.range() => Ok(()),
        Some(layout) => Err(ValidationError::LayoutMismatch {
            expected: layout.info.range(),
            actual: info.range(),
        }),
        None => Err(ValidationError::UnexpectedPage {
            start: info.start,
            end: info.end,
        }),
    }
}

/// The listing table must hold one link per occurrence in the page's range
pub fn check_link_count(info: &PageInfo, actual: usize) -> Result<(), ValidationError> {
    let expected = info.expected_links();
    if actual != expected {
        return Err(ValidationError::LinkCountMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(total: u64, start: u64, end: u64) -> PageInfo {
        PageInfo::new(total, start, end).unwrap()
    }

    #[test]
    fn test_check_total() {
        assert!(check_total(50, &info(50, 1, 20)).is_ok());
        assert_eq!(
            check_total(50, &info(48, 41, 48)),
            Err(ValidationError::TotalMismatch {
                expected: 50,
                actual: 48
            })
        );
        assert!(check_total(50, &info(51, 41, 51)).is_err());
    }

    #[test]
    fn test_check_continuation() {
        assert!(check_continuation(None, &info(300, 1, 100)).is_ok());
        assert!(check_continuation(Some(&info(300, 1, 100)), &info(300, 101, 200)).is_ok());

        assert_eq!(
            check_continuation(None, &info(300, 101, 200)),
            Err(ValidationError::RangeGap {
                expected: 1,
                actual: 101
            })
        );
        assert_eq!(
            check_continuation(Some(&info(300, 1, 100)), &info(300, 100, 199)),
            Err(ValidationError::RangeGap {
                expected: 101,
                actual: 100
            })
        );
    }

    #[test]
    fn test_check_layout() {
        let layout = PageLayout {
            page: 2,
            info: info(300, 101, 200),
            link_count: 100,
        };

        assert!(check_layout(Some(&layout), &info(300, 101, 200)).is_ok());
        assert_eq!(
            check_layout(Some(&layout), &info(300, 99, 198)),
            Err(ValidationError::LayoutMismatch {
                expected: (101, 200),
                actual: (99, 198)
            })
        );
        assert_eq!(
            check_layout(None, &info(300, 201, 300)),
            Err(ValidationError::UnexpectedPage {
                start: 201,
                end: 300
            })
        );
    }

    #[test]
    fn test_check_link_count() {
        assert!(check_link_count(&info(250, 201, 250), 50).is_ok());
        assert!(check_link_count(&info(250, 1, 100), 100).is_ok());
        assert_eq!(
            check_link_count(&info(250, 1, 100), 99),
            Err(ValidationError::LinkCountMismatch {
                expected: 100,
                actual: 99
            })
        );
    }
}

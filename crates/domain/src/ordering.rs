//! Relative ordering of ids inside a single column.

/// Place `moved` at `target_index` in `ordered`.
///
/// `moved` is first removed from the list if it is there, then inserted so
/// that it sits at `target_index` in the returned list. Indices past the end
/// append. Everything else keeps its relative order.
pub fn reorder<T>(ordered: &[T], moved: &T, target_index: usize) -> Vec<T>
where
    T: Clone + PartialEq,
{
    let mut result: Vec<T> = ordered.iter().filter(|id| *id != moved).cloned().collect();
    let index = target_index.min(result.len());
    result.insert(index, moved.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_moves_item_forward() {
        let result = reorder(&ids(&["a", "b", "c"]), &"a".to_string(), 2);
        assert_eq!(result, ids(&["b", "c", "a"]));
    }

    #[test]
    fn test_moves_item_to_top() {
        let result = reorder(&ids(&["a", "b", "c"]), &"c".to_string(), 0);
        assert_eq!(result, ids(&["c", "a", "b"]));
    }

    #[test]
    fn test_inserts_item_not_in_list() {
        let result = reorder(&ids(&["a", "b"]), &"c".to_string(), 1);
        assert_eq!(result, ids(&["a", "c", "b"]));
    }

    #[test]
    fn test_empty_list() {
        let result = reorder::<String>(&[], &"a".to_string(), 0);
        assert_eq!(result, ids(&["a"]));
    }

    #[test]
    fn test_out_of_range_index_appends() {
        let result = reorder(&ids(&["a", "b"]), &"c".to_string(), 99);
        assert_eq!(result, ids(&["a", "b", "c"]));

        let result = reorder(&ids(&["a", "b", "c"]), &"a".to_string(), 3);
        assert_eq!(result, ids(&["b", "c", "a"]));
    }

    #[test]
    fn test_unchanged_position_is_noop() {
        let list = ids(&["a", "b", "c"]);
        for (k, id) in list.iter().enumerate() {
            assert_eq!(reorder(&list, id, k), list);
        }
    }

    #[test]
    fn test_every_target_index_places_item_exactly_once() {
        let list = ids(&["a", "b", "c", "d"]);
        for moved in ["a", "c", "z"] {
            let moved = moved.to_string();
            let expected_len = if list.contains(&moved) { list.len() } else { list.len() + 1 };
            for k in 0..expected_len {
                let result = reorder(&list, &moved, k);
                assert_eq!(result.len(), expected_len);
                assert_eq!(result[k], moved);
                assert_eq!(result.iter().filter(|id| **id == moved).count(), 1);

                let others: Vec<&String> = result.iter().filter(|id| **id != moved).collect();
                let original: Vec<&String> = list.iter().filter(|id| **id != moved).collect();
                assert_eq!(others, original);
            }
        }
    }
}

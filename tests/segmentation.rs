//! End-to-end behavior of the shipped dictionary and model tables.

use hanseg::{PosSegmenter, Segmenter, TagExtractor, TextRanker};

#[test]
fn test_cut_end_to_end() {
    let seg = Segmenter::new();
    assert_eq!(seg.cut("我爱北京天安门", true), vec!["我", "爱", "北京", "天安门"]);
    assert_eq!(
        seg.cut("我们中出了一个叛徒", true),
        vec!["我们", "中出", "了", "一个", "叛徒"]
    );
    assert_eq!(seg.cut_all("网球拍卖会"), vec!["网球", "网球拍", "球拍", "拍卖", "拍卖会"]);
    assert_eq!(
        seg.cut_for_search("南京市长江大桥", true),
        vec!["南京", "京市", "南京市", "长江", "大桥", "长江大桥"]
    );
}

#[test]
fn test_parallel_cut() {
    let seg = Segmenter::new();
    let sentences = [
        "我爱北京天安门",
        "我们中出了一个叛徒",
        "今天天气不错，昨天天气不错",
        "程序员average年龄28.6岁。",
    ];
    let expected: Vec<Vec<&str>> = sentences.iter().map(|s| seg.cut(s, true)).collect();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (sentence, exp) in sentences.iter().zip(&expected) {
                    assert_eq!(seg.cut(sentence, true), *exp);
                }
            });
        }
    });
}

#[test]
fn test_user_dictionary_merges() {
    let mut seg = Segmenter::load_dictionary("出 5\n行 5\n".as_bytes()).unwrap();
    assert_eq!(seg.cut("出行", false), vec!["出", "行"]);
    seg.load_user_dictionary("出行 20\n".as_bytes()).unwrap();
    assert_eq!(seg.cut("出行", false), vec!["出行"]);
}

#[test]
fn test_delete_word_splits() {
    let mut seg = Segmenter::load_dictionary("中将 10\n中 5\n将 5\n".as_bytes()).unwrap();
    assert_eq!(seg.cut("中将", false), vec!["中将"]);
    seg.delete_word("中将");
    assert_eq!(seg.cut("中将", false), vec!["中", "将"]);
}

#[test]
fn test_pos_end_to_end() {
    let seg = PosSegmenter::new();
    let segments = seg.cut("我爱北京天安门", true);
    let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
    assert_eq!(
        pairs,
        vec![("我", "r"), ("爱", "v"), ("北京", "ns"), ("天安门", "ns")]
    );
}

#[test]
fn test_extractors_end_to_end() {
    let seg = Segmenter::new();
    let extractor = TagExtractor::new_with_segmenter(&seg);
    let tags = extractor.extract_tags("今天天气不错，昨天天气不错，天气影响心情", 3);
    let words: Vec<&str> = tags.iter().map(|t| t.keyword.as_str()).collect();
    assert_eq!(words, vec!["不错", "天气", "影响"]);

    let pos_seg = PosSegmenter::new();
    let ranker = TextRanker::new_with_segmenter(&pos_seg);
    let tags = ranker.text_rank("北京天气，北京天气", 5);
    assert_eq!(tags[0].keyword, "天气");
    assert_eq!(tags[0].weight, 1.0);
}

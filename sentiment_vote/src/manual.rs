/*!

This is the long-form manual for `sentiment_vote` and `facsent`.

## Labels

Every oracle vote is reduced to one of three labels: `POSITIVE`, `NEGATIVE`,
`NEUTRAL`. Oracles may answer with:
* a label name, in any case (`positive`, `NEGATIVE`, ...)
* the class id of a 3-way classifier, as `LABEL_0` or `0`: `0` is negative,
  `1` is neutral, `2` is positive.

Any other answer (for example `4 stars`) stops the processing with an error
that names the oracle. Labels are mapped before they are counted, so `LABEL_2`
and `POSITIVE` are two votes for the same label.

## Resolving the votes of one text

The label with the most votes wins. When several labels share the highest
count, the `tiebreakMode` rule decides:

* `preferNeutral` (default)

| tied labels                     | result     |
|---------------------------------|------------|
| positive, negative, neutral     | `NEUTRAL`  |
| positive, negative              | `NEUTRAL`  |
| positive, neutral               | `POSITIVE` |
| negative, neutral               | `NEGATIVE` |

* `useLabelOrder`: the first tied label in the order positive, negative, neutral.

Neither rule depends on the order in which the oracles were run.

## Resolving the verdict of a faculty member

The labels of all the feedback rows are counted. Missing labels count as 0.
The checks below are applied in this order and the first one that matches
decides:

1. all three counts are equal (including no feedback at all): `NEUTRAL`
2. positive equals negative: `NEUTRAL`
3. positive equals neutral: `POSITIVE`
4. negative equals neutral: `NEGATIVE`
5. otherwise `POSITIVE` if positive is greater than negative, `NEGATIVE` if
   negative is greater than positive

Note that this is not a majority rule. With 1 positive, 4 negative and 1
neutral feedback, check 3 applies and the verdict is `POSITIVE`.

The verdict is stored with the faculty record as a number: `0` negative,
`1` positive, `2` neutral, `-1` when no feedback was processed yet.

## Input formats

### csv

The first row is a header. The feedback text is read from the column named
`feedback` (see `feedbackColumn` below). Other columns are ignored.

```text
student,feedback
s1,Very clear lectures
s2,Too fast and confusing
```

### xlsx

The first worksheet (or the one given with `--worksheet`), same layout as csv.

The name of the faculty member is the name of the file without extension,
in lower case: `Smith.csv` is the feedback of `smith`.

## Configuration

A JSON file, all the entries are optional:

```text
{
  "outputSettings": {
    "facultyFile": "faculty.json",
    "analyzedFeedbackFile": "Analyzed_feedback.json",
    "uploadDirectory": "uploads"
  },
  "rules": {
    "tiebreakMode": "preferNeutral",
    "feedbackColumn": "feedback"
  },
  "oracles": [
    { "name": "lexicon-band", "kind": "lexicon", "threshold": 0.05 },
    { "name": "lexicon-strict", "kind": "lexicon", "threshold": "strict" },
    { "name": "roberta", "kind": "command", "program": "python3", "args": ["classify.py"] }
  ]
}
```

Relative paths are resolved against the directory of the configuration file.

A `command` oracle receives the text on its standard input and must print a
single label on its standard output.

 */

/*!

This is the long-form manual for `survey_stats` and `hrpulse`.

## Input data

The input is one table with one row per respondent and one column per
question. It can be provided as:
* `xlsx` an Excel workbook. The first worksheet is read, unless a worksheet name is given.
* `csv` a comma separated file with a header row.

Either format can also be read from a URL. The file is then downloaded once into a
cache directory and read from there afterwards.

Cells are read as text. Blank cells are missing answers. Integral numbers are read
without their fractional part: a rating stored as `4.0` by the spreadsheet is read as `4`.

Three kinds of questions are supported:

* **ratings** integers from 1 (worst) to 5 (best). Any other value in a rating column
  is an error for the page that displays it.
* **multi-value answers** several choices separated by `;`, as exported by Microsoft Forms:
  `Payroll;Recruiting;`. One trailing separator is ignored, empty choices are dropped.
* **free text** comments, reasons and suggestions.

## Columns

Each question used by the dashboard has a name (for example `overallRating` or `role`).
By default a question is found either by the exact text of its header, or by its position
in the questionnaire. The configuration file can override any of them:

```text
"columns": {
    "overallRating": "L",
    "role": "What is your role at the company ?",
    "payrollRating": 50
}
```

A column can be given by its header text, its 1-based number, or its Excel letters
(`L`, `AB`). All the columns are resolved when the data is loaded: a missing column
rejects the file.

## Filters

The respondents can be filtered by role, function and location. Within a dimension the
chosen values are alternatives (`Europe` or `Asia`); across dimensions they must all hold
(located in Europe and Manager). A dimension with no chosen value does not filter anything.

Changing the page clears all the filters.

## Pages

| slug | title |
|------|-------|
| `general` | General Survey Results |
| `employee-experience` | Section 1: Employee Experience |
| `recruiting-onboarding` | Section 2: Recruiting & Onboarding |
| `performance-talent` | Section 3: Performance & Talent |
| `learning` | Section 4: Learning |
| `compensation` | Section 5: Compensation |
| `payroll` | Section 6: Payroll |
| `time-management` | Section 7: Time Management |
| `user-experience` | Section 8: User Experience |

Each page is rendered as a JSON report made of widgets: score distributions with their
median, breakdowns of multi-value answers, yes/no proportions, word tables and text
summaries. A page that cannot be computed is reported with the status `error` and a message;
the other pages are not affected.

Some proportions only concern a part of the respondents (the payroll questions are only
asked to the members of a payroll team). When nobody in the current selection belongs to
that part, the proportion is reported as not applicable (`null`).

## Text models

The sentiment, emotion and summary widgets call text models through an HTTP inference
service. The models are optional: when the service is not configured or fails, the widget
is replaced by a notice and the rest of the page is still rendered.

*/

/// Words the base grammar gives meaning to. They lex as keywords and must be
/// quoted to be used as identifiers.
pub(crate) const ANSI_RESERVED_KEYWORDS: &str = "ALL
AND
AS
ASC
BETWEEN
BY
CASE
CROSS
DESC
DISTINCT
ELSE
END
EXISTS
FALSE
FROM
FULL
GROUP
HAVING
IN
INNER
INTERSECT
IS
JOIN
LEFT
LIKE
LIMIT
NOT
NULL
ON
OR
ORDER
OUTER
RIGHT
SELECT
THEN
TRUE
UNION
USING
WHEN
WHERE
WITH";

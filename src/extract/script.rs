//! The in-page extraction script
//!
//! One script pass discovers every interactive element and returns an array
//! of raw JSON objects. Tier A covers natively interactive elements (links,
//! buttons, forms, ARIA equivalents); tier B covers pattern-based widgets
//! (tabs, accordions, menus, pointer-cursor clickables). Elements are
//! deduplicated within the page by `type:selector`.

/// Evaluated once per visited page; returns the raw element array
pub const EXTRACTION_JS: &str = r#"(() => {
    const elements = [];
    const viewportHeight = window.innerHeight;
    const seen = new Set();

    function getLabel(el) {
        const text = (el.innerText || '').trim();
        if (text && text.length > 0 && text.length < 200) return text;

        const ariaLabel = el.getAttribute('aria-label');
        if (ariaLabel) return ariaLabel.trim();

        const labelledBy = el.getAttribute('aria-labelledby');
        if (labelledBy) {
            const ids = labelledBy.split(/\s+/);
            const parts = ids.map(id => {
                const ref = document.getElementById(id);
                return ref ? (ref.innerText || '').trim() : '';
            }).filter(Boolean);
            if (parts.length) return parts.join(' ');
        }

        if (el.title) return el.title.trim();

        const img = el.querySelector('img[alt]');
        if (img && img.alt) return img.alt.trim();

        if (el.value && typeof el.value === 'string') return el.value.trim();

        if (el.placeholder) return el.placeholder.trim();

        // Long visible text loses to the attributes above; truncate it here
        if (text && text.length >= 200) return text.substring(0, 197) + '...';

        return null;
    }

    function getSectionContext(el) {
        // Walk up the tree, scanning previous siblings for the nearest heading
        let current = el;
        let depth = 0;
        while (current && current !== document.body && depth < 10) {
            let sibling = current.previousElementSibling;
            let siblingDepth = 0;
            while (sibling && siblingDepth < 5) {
                if (/^H[1-3]$/i.test(sibling.tagName)) {
                    return (sibling.innerText || '').trim().substring(0, 200);
                }
                const nested = sibling.querySelector('h1, h2, h3');
                if (nested) {
                    return (nested.innerText || '').trim().substring(0, 200);
                }
                sibling = sibling.previousElementSibling;
                siblingDepth++;
            }
            current = current.parentElement;
            depth++;
        }
        // Fallback: first heading of the enclosing container
        const parent = el.closest('section, article, div[class], main, aside');
        if (parent) {
            const heading = parent.querySelector('h1, h2, h3');
            if (heading) return (heading.innerText || '').trim().substring(0, 200);
        }
        return null;
    }

    function getContainerContext(el) {
        let current = el.parentElement;
        while (current && current !== document.body) {
            const tag = current.tagName.toLowerCase();
            const role = (current.getAttribute('role') || '').toLowerCase();

            if (tag === 'header' || role === 'banner') return 'header';
            if (tag === 'nav' || role === 'navigation') return 'nav';
            if (tag === 'main' || role === 'main') return 'main';
            if (tag === 'footer' || role === 'contentinfo') return 'footer';
            if (tag === 'aside' || role === 'complementary') return 'aside';
            if (tag === 'dialog' || role === 'dialog') return 'dialog';

            current = current.parentElement;
        }
        return 'unknown';
    }

    function isAboveFold(el) {
        try {
            const rect = el.getBoundingClientRect();
            return rect.top < viewportHeight && rect.bottom > 0;
        } catch { return false; }
    }

    function isVisible(el) {
        try {
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 && rect.height === 0) return false;
            const style = window.getComputedStyle(el);
            if (style.display === 'none') return false;
            if (style.visibility === 'hidden') return false;
            if (parseFloat(style.opacity) === 0) return false;
            return true;
        } catch { return false; }
    }

    function getSelector(el) {
        try {
            if (el.id) return '#' + CSS.escape(el.id);

            const parts = [];
            let current = el;
            let depth = 0;
            while (current && current !== document.body && depth < 5) {
                let selector = current.tagName.toLowerCase();
                if (current.id) {
                    parts.unshift('#' + CSS.escape(current.id));
                    break;
                }
                if (current.className && typeof current.className === 'string') {
                    const cls = current.className.trim().split(/\s+/)
                        .filter(c => c.length < 40 && !c.includes(':'))
                        .slice(0, 2);
                    if (cls.length) selector += '.' + cls.map(c => CSS.escape(c)).join('.');
                }
                // Disambiguate among same-tag siblings
                if (current.parentElement) {
                    const siblings = Array.from(current.parentElement.children)
                        .filter(s => s.tagName === current.tagName);
                    if (siblings.length > 1) {
                        const idx = siblings.indexOf(current) + 1;
                        selector += ':nth-child(' + idx + ')';
                    }
                }
                parts.unshift(selector);
                current = current.parentElement;
                depth++;
            }
            return parts.join(' > ').substring(0, 500);
        } catch { return el.tagName.toLowerCase(); }
    }

    function addElement(el, type, actionType) {
        if (!isVisible(el)) return;

        const selector = getSelector(el);
        const key = type + ':' + selector;
        if (seen.has(key)) return;
        seen.add(key);

        const label = getLabel(el);
        const href = el.href || el.getAttribute('href') || null;
        let targetUrl = null;
        let isExternal = false;

        if (href && !href.startsWith('javascript:')) {
            try {
                const url = new URL(href, location.origin);
                targetUrl = url.href;
                isExternal = url.hostname !== location.hostname;
            } catch {}
        }

        elements.push({
            element_type: type,
            action_type: actionType,
            element_text: label ? label.substring(0, 500) : null,
            css_selector: selector,
            section_context: getSectionContext(el),
            container_context: getContainerContext(el),
            is_above_fold: isAboveFold(el),
            target_url: targetUrl,
            is_external: isExternal,
        });
    }

    // Tier A: natively interactive elements

    document.querySelectorAll('a[href]').forEach(el => {
        const href = (el.getAttribute('href') || '').toLowerCase();
        if (href.startsWith('mailto:') || href.startsWith('tel:')) {
            addElement(el, 'link', 'other');
        } else if (href.match(/\.(pdf|doc|docx|xls|xlsx|ppt|pptx|zip|csv)$/i)) {
            addElement(el, 'download', 'download');
        } else {
            addElement(el, 'link', 'navigate');
        }
    });

    document.querySelectorAll('button, input[type="button"], input[type="submit"], input[type="reset"]').forEach(el => {
        const t = (el.type || '').toLowerCase();
        addElement(el, 'button', t === 'submit' ? 'submit' : 'other');
    });

    document.querySelectorAll('form').forEach(el => {
        addElement(el, 'form', 'submit');
    });

    document.querySelectorAll('[onclick]').forEach(el => {
        if (!el.matches('a, button, input[type="button"], input[type="submit"]')) {
            addElement(el, 'button', 'other');
        }
    });

    document.querySelectorAll('[role="button"]').forEach(el => {
        if (!el.matches('button, input[type="button"], input[type="submit"]')) {
            addElement(el, 'button', 'other');
        }
    });

    document.querySelectorAll('[role="link"]').forEach(el => {
        if (!el.matches('a')) {
            addElement(el, 'link', 'navigate');
        }
    });

    // Tier B: pattern-based widgets

    document.querySelectorAll('[role="tab"]').forEach(el => {
        addElement(el, 'tab', 'toggle');
    });

    document.querySelectorAll('[aria-expanded]').forEach(el => {
        if (!el.matches('[role="tab"]')) {
            addElement(el, 'accordion', 'expand');
        }
    });

    document.querySelectorAll('[role="menuitem"], [role="menuitemcheckbox"], [role="menuitemradio"]').forEach(el => {
        addElement(el, 'menu', 'navigate');
    });

    document.querySelectorAll('summary').forEach(el => {
        addElement(el, 'accordion', 'toggle');
    });

    document.querySelectorAll('select').forEach(el => {
        addElement(el, 'form', 'toggle');
    });

    document.querySelectorAll('[style*="cursor: pointer"], [style*="cursor:pointer"]').forEach(el => {
        if (!el.matches('a, button, input, select, [role="button"], [role="link"], [role="tab"], [role="menuitem"], [onclick], summary')) {
            addElement(el, 'button', 'other');
        }
    });

    return elements;
})()"#;
